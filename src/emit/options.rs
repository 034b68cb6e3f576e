//! Emitter options.

use serde::{Deserialize, Serialize};

use crate::text::TextNormalizer;

/// Options for building and writing the output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitOptions {
    /// Directory name of the media files, relative to the XML file
    pub media_dir: String,

    /// Drop soft hyphens when rejoining the lines of a block
    pub repair_hyphenation: bool,

    /// Emit `<remark>` nodes for diagnostics
    pub include_diagnostics: bool,

    /// Normalization applied to every text node
    pub normalizer: TextNormalizer,

    /// Spaces per indentation level in the XML output
    pub indent: usize,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            media_dir: "media".to_string(),
            repair_hyphenation: true,
            include_diagnostics: true,
            normalizer: TextNormalizer::default(),
            indent: 2,
        }
    }
}

impl EmitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the media directory name.
    pub fn with_media_dir(mut self, dir: impl Into<String>) -> Self {
        self.media_dir = dir.into();
        self
    }

    /// Enable or disable soft-hyphen repair inside blocks.
    pub fn with_hyphenation_repair(mut self, enabled: bool) -> Self {
        self.repair_hyphenation = enabled;
        self
    }

    /// Enable or disable diagnostic nodes.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.include_diagnostics = enabled;
        self
    }

    /// Enable or disable ligature expansion.
    pub fn with_ligature_fix(mut self, enabled: bool) -> Self {
        self.normalizer.fix_ligatures = enabled;
        self
    }

    /// Relative path of a media file in the output.
    pub fn fileref(&self, file_name: &str) -> String {
        let dir = self.media_dir.trim_end_matches('/');
        if dir.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", dir, file_name)
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.media_dir.contains("..") {
            return Err("emit.media_dir must stay inside the output directory".to_string());
        }
        Ok(())
    }
}
