//! Table candidates and their validation outcome.

use serde::{Deserialize, Serialize};

use super::{BlockId, BoundingBox, Diagnostic};

/// Page-local handle of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableIdx(pub u32);

/// Which validation tier accepted the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Tier 1: a drawn-line grid confirmed the boundary.
    HasStructure,
    /// Tier 2: text alignment confirmed the boundary.
    TextValidated,
    /// Tier 3: nothing confirmed it; candidate kept as is.
    TextOnly,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::HasStructure => "has_structure",
            ValidationStatus::TextValidated => "text_validated",
            ValidationStatus::TextOnly => "text_only",
        }
    }

    /// Evidence used by the tier.
    pub fn method(&self) -> &'static str {
        match self {
            ValidationStatus::HasStructure => "drawing_lines",
            ValidationStatus::TextValidated => "text_analysis",
            ValidationStatus::TextOnly => "none",
        }
    }
}

/// A cell as delivered by the table extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub bbox: BoundingBox,
    #[serde(default)]
    pub text: String,
}

impl TableCell {
    pub fn new(bbox: BoundingBox, text: impl Into<String>) -> Self {
        Self {
            bbox,
            text: text.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A table row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }

    /// Mean of the cells' vertical centers.
    pub fn center_y(&self) -> Option<f32> {
        if self.cells.is_empty() {
            return None;
        }
        let sum: f32 = self.cells.iter().map(|c| c.bbox.center_y()).sum();
        Some(sum / self.cells.len() as f32)
    }

    pub fn non_empty_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.non_empty_count() == 0
    }

    /// Longest trimmed cell text, in characters.
    pub fn max_cell_len(&self) -> usize {
        self.cells
            .iter()
            .map(|c| c.text.trim().chars().count())
            .max()
            .unwrap_or(0)
    }

    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.text.trim())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// A table candidate plus the fields the validator and heuristics fill in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,

    #[serde(skip)]
    pub page: u32,

    /// Candidate boundary from the extractor.
    pub bbox: BoundingBox,

    pub rows: Vec<TableRow>,

    /// Boundary confirmed by tier 1 or tier 2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_bbox: Option<BoundingBox>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationStatus>,

    /// The first row is a confirmed header.
    #[serde(default)]
    pub has_header: bool,

    /// Rows dropped by header cleaning and tier filtering.
    #[serde(default)]
    pub rows_removed: usize,

    #[serde(skip)]
    pub caption: Option<BlockId>,

    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,

    /// Rows as extracted, before validation rewrote `rows`.
    #[serde(skip)]
    pub candidate_rows: Option<Vec<TableRow>>,
}

impl Table {
    pub fn new(id: impl Into<String>, bbox: BoundingBox, rows: Vec<TableRow>) -> Self {
        Self {
            id: id.into(),
            page: 0,
            bbox,
            rows,
            validated_bbox: None,
            validation: None,
            has_header: false,
            rows_removed: 0,
            caption: None,
            diagnostics: Vec::new(),
            candidate_rows: None,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row decides the column count.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Region whose fragments belong to the table rather than the text flow.
    pub fn exclusion_zone(&self) -> BoundingBox {
        self.validated_bbox.unwrap_or(self.bbox)
    }

    pub fn status(&self) -> ValidationStatus {
        self.validation.unwrap_or(ValidationStatus::TextOnly)
    }

    pub fn header(&self) -> &[TableRow] {
        if self.has_header && !self.rows.is_empty() {
            &self.rows[..1]
        } else {
            &[]
        }
    }

    pub fn body(&self) -> &[TableRow] {
        &self.rows[self.header().len()..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(y: f32, text: &str) -> TableCell {
        TableCell::new(BoundingBox::new(0.0, y, 50.0, y + 10.0), text)
    }

    #[test]
    fn test_row_metrics() {
        let row = TableRow::new(vec![cell(100.0, "Name"), cell(100.0, " "), cell(102.0, "Value")]);
        assert_eq!(row.non_empty_count(), 2);
        assert_eq!(row.max_cell_len(), 5);
        let center = row.center_y().unwrap();
        assert!((center - 105.666_67).abs() < 0.01);
        assert!(TableRow::default().center_y().is_none());
    }

    #[test]
    fn test_header_and_body() {
        let mut table = Table::new(
            "t1",
            BoundingBox::new(0.0, 0.0, 100.0, 100.0),
            vec![
                TableRow::new(vec![cell(0.0, "A"), cell(0.0, "B")]),
                TableRow::new(vec![cell(20.0, "1"), cell(20.0, "2"), cell(20.0, "3")]),
            ],
        );
        assert_eq!(table.column_count(), 3);
        assert!(table.header().is_empty());
        assert_eq!(table.body().len(), 2);

        table.has_header = true;
        assert_eq!(table.header().len(), 1);
        assert_eq!(table.body().len(), 1);
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(ValidationStatus::HasStructure.as_str(), "has_structure");
        assert_eq!(ValidationStatus::TextValidated.method(), "text_analysis");
        let table = Table::new("t", BoundingBox::default(), vec![]);
        assert_eq!(table.status(), ValidationStatus::TextOnly);
    }
}
