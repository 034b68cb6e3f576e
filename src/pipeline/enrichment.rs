//! Optional non-deterministic post-pass.
//!
//! The deterministic core knows nothing about enrichment. A caller that
//! wants it builds a [`Capabilities`] value and hands it to the pipeline;
//! the pass then runs on a copy of the finished tree in a background
//! thread, bounded by a timeout. Its notes are advisory and never touch
//! the XML output.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::emit::DocumentTree;

/// One suggestion from an enrichment pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    /// Name of the pass that produced it
    pub source: String,
    /// 1-based page, when the note concerns one page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub note: String,
}

/// A post-pass over a finished document tree.
pub trait EnrichmentPass: Send + Sync {
    /// Short name used in logs and on advisories.
    fn name(&self) -> &str;

    /// Inspect the tree and return advisory notes.
    fn enrich(&self, tree: &DocumentTree) -> Vec<Advisory>;
}

/// Switches that must all be on before a pass may run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentGate {
    pub enabled: bool,
    /// Whether the caller found a credential for the external service
    pub credential_present: bool,
    pub timeout: Duration,
}

impl Default for EnrichmentGate {
    fn default() -> Self {
        Self {
            enabled: false,
            credential_present: false,
            timeout: Duration::from_secs(30),
        }
    }
}

impl EnrichmentGate {
    pub fn new(enabled: bool, credential_present: bool) -> Self {
        Self {
            enabled,
            credential_present,
            ..Default::default()
        }
    }

    /// Gate whose credential check reads the named environment variable once.
    pub fn from_env(enabled: bool, credential_var: &str) -> Self {
        let credential_present = std::env::var(credential_var).map_or(false, |v| !v.trim().is_empty());
        Self::new(enabled, credential_present)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_open(&self) -> bool {
        self.enabled && self.credential_present
    }
}

/// Optional features granted by the caller. Default: none.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub enrichment: Option<EnrichmentGate>,
    pub pass: Option<Arc<dyn EnrichmentPass>>,
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("enrichment", &self.enrichment)
            .field("pass", &self.pass.as_ref().map(|p| p.name().to_string()))
            .finish()
    }
}

impl Capabilities {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_enrichment(gate: EnrichmentGate, pass: Arc<dyn EnrichmentPass>) -> Self {
        Self {
            enrichment: Some(gate),
            pass: Some(pass),
        }
    }

    /// Run the pass if the gate is open. Returns no notes when the gate
    /// is closed, the pass panics, or the timeout elapses.
    pub fn run(&self, tree: &DocumentTree) -> Vec<Advisory> {
        let (Some(gate), Some(pass)) = (&self.enrichment, &self.pass) else {
            return Vec::new();
        };
        if !gate.is_open() {
            log::debug!("enrichment gate closed for {}", pass.name());
            return Vec::new();
        }

        let (tx, rx) = crossbeam_channel::bounded(1);
        let pass = Arc::clone(pass);
        let tree = tree.clone();
        thread::spawn(move || {
            let _ = tx.send(pass.enrich(&tree));
        });

        match rx.recv_timeout(gate.timeout) {
            Ok(notes) => notes,
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                log::warn!("enrichment timed out after {:?}", gate.timeout);
                Vec::new()
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                log::warn!("enrichment pass ended without a result");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{Node, Paragraph};

    struct CountParagraphs;

    impl EnrichmentPass for CountParagraphs {
        fn name(&self) -> &str {
            "count"
        }

        fn enrich(&self, tree: &DocumentTree) -> Vec<Advisory> {
            let mut n = 0;
            tree.walk(&mut |node, _| {
                if matches!(node, Node::Paragraph(_)) {
                    n += 1;
                }
            });
            vec![Advisory {
                source: self.name().to_string(),
                page: None,
                note: format!("{} paragraphs", n),
            }]
        }
    }

    struct Sleepy;

    impl EnrichmentPass for Sleepy {
        fn name(&self) -> &str {
            "sleepy"
        }

        fn enrich(&self, _tree: &DocumentTree) -> Vec<Advisory> {
            thread::sleep(Duration::from_millis(500));
            vec![Advisory {
                source: "sleepy".to_string(),
                page: None,
                note: "late".to_string(),
            }]
        }
    }

    fn tree() -> DocumentTree {
        DocumentTree {
            identifier: "id".to_string(),
            page_count: 1,
            root: vec![Node::Paragraph(Paragraph { text: "a".to_string() })],
        }
    }

    #[test]
    fn test_no_capability_runs_nothing() {
        assert!(Capabilities::none().run(&tree()).is_empty());
    }

    #[test]
    fn test_gate_needs_credential() {
        let caps = Capabilities::with_enrichment(EnrichmentGate::new(true, false), Arc::new(CountParagraphs));
        assert!(caps.run(&tree()).is_empty());
    }

    #[test]
    fn test_open_gate_runs_pass() {
        let caps = Capabilities::with_enrichment(EnrichmentGate::new(true, true), Arc::new(CountParagraphs));
        let notes = caps.run(&tree());
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].note, "1 paragraphs");
    }

    #[test]
    fn test_timeout_drops_notes() {
        let gate = EnrichmentGate::new(true, true).with_timeout(Duration::from_millis(20));
        let caps = Capabilities::with_enrichment(gate, Arc::new(Sleepy));
        assert!(caps.run(&tree()).is_empty());
    }
}
