//! JSON report written next to the XML document.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::result::{ConversionStats, DiagnosticRecord};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Statistics and every diagnostic of one conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    pub identifier: String,
    pub stats: ConversionStats,
    pub diagnostics: Vec<DiagnosticRecord>,
}

impl DiagnosticsReport {
    pub fn new(identifier: impl Into<String>, stats: ConversionStats, diagnostics: Vec<DiagnosticRecord>) -> Self {
        Self {
            identifier: identifier.into(),
            stats,
            diagnostics,
        }
    }

    /// Diagnostics of one category.
    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a DiagnosticRecord> {
        self.diagnostics.iter().filter(move |d| d.category == category)
    }
}

/// Serialize a report.
pub fn to_json(report: &DiagnosticsReport, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(report),
        JsonFormat::Compact => serde_json::to_string(report),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> DiagnosticsReport {
        DiagnosticsReport::new(
            "978-1-00-000000-1",
            ConversionStats {
                page_count: 3,
                ..Default::default()
            },
            vec![
                DiagnosticRecord {
                    page: 2,
                    category: "table_unvalidated".to_string(),
                    reason: "no ruling".to_string(),
                },
                DiagnosticRecord {
                    page: 3,
                    category: "image_only_page".to_string(),
                    reason: "page 3: no extractable text, needs manual review".to_string(),
                },
            ],
        )
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&report(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"identifier\": \"978-1-00-000000-1\""));
        assert!(json.contains("\"page_count\": 3"));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact_parses_back() {
        let json = to_json(&report(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        let back: DiagnosticsReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report());
    }

    #[test]
    fn test_by_category() {
        let r = report();
        assert_eq!(r.by_category("image_only_page").count(), 1);
        assert_eq!(r.by_category("heading_ambiguous").count(), 0);
    }
}
