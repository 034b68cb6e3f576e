//! Structural roles and diagnostics attached to blocks.

use serde::{Deserialize, Serialize};

use super::{BlockId, MediaIdx, TableIdx};

/// Document-unique list handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListId(pub u32);

/// Marker family of a list item. Items only group with the same family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Bullet(char),
    Decimal,
    LowerAlpha,
    UpperAlpha,
    Roman,
}

impl MarkerKind {
    /// Ordered markers emit an `orderedlist`.
    pub fn is_ordered(&self) -> bool {
        !matches!(self, MarkerKind::Bullet(_))
    }
}

/// What a caption labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionTarget {
    Figure(MediaIdx),
    Table(TableIdx),
}

/// Role tag of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    Heading { level: u8 },
    ListItem { list: ListId, marker: MarkerKind },
    Caption { target: CaptionTarget },
    Equation,
    Paragraph,
}

impl Role {
    pub fn is_heading(&self) -> bool {
        matches!(self, Role::Heading { .. })
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self, Role::ListItem { .. })
    }
}

/// Category of a low-confidence decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    HeadingAmbiguous,
    TableUnvalidated,
    TableRowsTrimmed,
    ColumnLayoutDegenerate,
    ImageOnlyPage,
    FormRenderMissing,
    MediaFileMissing,
}

impl DiagnosticKind {
    /// Machine-readable category string used in the output.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::HeadingAmbiguous => "heading_ambiguous",
            DiagnosticKind::TableUnvalidated => "table_unvalidated",
            DiagnosticKind::TableRowsTrimmed => "table_rows_trimmed",
            DiagnosticKind::ColumnLayoutDegenerate => "column_layout_degenerate",
            DiagnosticKind::ImageOnlyPage => "image_only_page",
            DiagnosticKind::FormRenderMissing => "form_render_missing",
            DiagnosticKind::MediaFileMissing => "media_file_missing",
        }
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A low-confidence annotation. Never changes structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub reason: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

/// Document-wide reference to a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockRef {
    pub page: u32,
    pub block: BlockId,
}

impl BlockRef {
    pub fn new(page: u32, block: BlockId) -> Self {
        Self { page, block }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_ordering() {
        assert!(!MarkerKind::Bullet('•').is_ordered());
        assert!(MarkerKind::Decimal.is_ordered());
        assert!(MarkerKind::Roman.is_ordered());
    }

    #[test]
    fn test_diagnostic_kind_strings() {
        assert_eq!(DiagnosticKind::TableUnvalidated.as_str(), "table_unvalidated");
        let json = serde_json::to_string(&DiagnosticKind::HeadingAmbiguous).unwrap();
        assert_eq!(json, "\"heading_ambiguous\"");
    }

    #[test]
    fn test_role_serialization() {
        let role = Role::Heading { level: 2 };
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, r#"{"role":"heading","level":2}"#);
        assert!(role.is_heading());
        assert!(!Role::Paragraph.is_list_item());
    }
}
