//! Table structure validation.
//!
//! Table candidates from the extractor often swallow a caption above the
//! grid or a footnote below it. The validator only ever removes rows:
//!
//! - header cleaning drops leading rows that do not look like a header;
//! - tier 1 trims to the box spanned by drawn ruling lines;
//! - tier 2, when there is no grid, trims to the box spanned by aligned text;
//! - tier 3 keeps the candidate as it is.
//!
//! A tier that cannot decide hands over to the next one. Nothing here
//! returns an error.

mod alignment;
mod grid;
mod header;

pub use alignment::{cluster_positions, validate_alignment, AlignmentRejection, PositionCluster};
pub use grid::{collect_ruling, Ruling};
pub use header::{clean_header, find_header_row, is_header_row};

use serde::{Deserialize, Serialize};

use crate::model::{
    BoundingBox, Diagnostic, DiagnosticKind, Drawing, Line, Page, Table, TableRow,
    ValidationStatus,
};

/// Thresholds for table validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableValidatorConfig {
    /// Margin around the candidate when collecting ruling lines
    pub drawing_margin: f32,
    /// Max off-axis delta for a segment to count as horizontal/vertical
    pub axis_tolerance: f32,
    /// Slack when testing a row's vertical center against the boundary
    pub row_center_slack: f32,
    /// Clustering tolerance for column x positions
    pub column_tolerance: f32,
    /// Lines needed for an x cluster to count as a column
    pub min_column_hits: usize,
    /// Clustering tolerance for row y positions
    pub row_tolerance: f32,
    /// Margin left of the leftmost column
    pub column_margin: f32,
    /// Margin above the top row
    pub row_top_margin: f32,
    /// Margin below the bottom row's top edge
    pub row_bottom_margin: f32,
    /// Smallest acceptable validated/candidate area ratio
    pub min_area_ratio: f32,
    /// Largest acceptable validated/candidate area ratio
    pub max_area_ratio: f32,
    /// Share of non-empty cells in a header row
    pub header_fill_ratio: f32,
    /// Header cells must be shorter than this (characters)
    pub header_cell_cap: usize,
    /// Minimum filled header cells
    pub header_min_filled: usize,
    /// Minimum filled header cells as a share of the column count
    pub header_min_filled_ratio: f32,
    /// Rows scanned for a header
    pub header_scan_rows: usize,
}

impl Default for TableValidatorConfig {
    fn default() -> Self {
        Self {
            drawing_margin: 5.0,
            axis_tolerance: 2.0,
            row_center_slack: 1.0,
            column_tolerance: 3.0,
            min_column_hits: 2,
            row_tolerance: 5.0,
            column_margin: 5.0,
            row_top_margin: 2.0,
            row_bottom_margin: 10.0,
            min_area_ratio: 0.5,
            max_area_ratio: 0.95,
            header_fill_ratio: 0.7,
            header_cell_cap: 80,
            header_min_filled: 2,
            header_min_filled_ratio: 0.5,
            header_scan_rows: 5,
        }
    }
}

impl TableValidatorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_area_ratio > self.max_area_ratio {
            return Err(format!(
                "tables.min_area_ratio ({}) exceeds max_area_ratio ({})",
                self.min_area_ratio, self.max_area_ratio
            ));
        }
        if !(0.0..=1.0).contains(&self.header_fill_ratio) {
            return Err("tables.header_fill_ratio must be within 0..1".to_string());
        }
        Ok(())
    }
}

/// Result of validating one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub status: ValidationStatus,
    pub validated_bbox: Option<BoundingBox>,
    pub rows_removed: usize,
}

/// Validates table candidates against drawings and text alignment.
#[derive(Debug, Clone, Default)]
pub struct TableValidator {
    config: TableValidatorConfig,
}

impl TableValidator {
    /// Create a validator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with custom configuration.
    pub fn with_config(config: TableValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TableValidatorConfig {
        &self.config
    }

    /// Validate one candidate in place.
    ///
    /// `lines` are the page's text lines (including text inside the
    /// candidate) and `drawings` its vector drawings.
    pub fn validate(&self, table: &mut Table, drawings: &[Drawing], lines: &[Line]) -> ValidationOutcome {
        // Revalidation starts over from the extracted rows.
        table.rows = table.candidate_rows.get_or_insert_with(|| table.rows.clone()).clone();
        table.diagnostics.clear();
        table.caption = None;
        let before = table.rows.len();

        // Header cleaning runs regardless of tier.
        let (_, header_found) = clean_header(&mut table.rows, &self.config);
        let header_row = if header_found { Some(0) } else { None };

        let (status, validated_bbox, kept) = self.run_tiers(table, drawings, lines);

        table.has_header = header_row.map_or(false, |h| kept.first() == Some(&h));
        if kept.len() < table.rows.len() {
            let rows = std::mem::take(&mut table.rows);
            table.rows = rows
                .into_iter()
                .enumerate()
                .filter(|(i, _)| kept.binary_search(i).is_ok())
                .map(|(_, r)| r)
                .collect();
        }

        table.validation = Some(status);
        table.validated_bbox = validated_bbox;
        table.rows_removed = before - table.rows.len();

        if status == ValidationStatus::TextOnly {
            table.diagnostics.push(Diagnostic::new(
                DiagnosticKind::TableUnvalidated,
                format!(
                    "table {}: no ruling grid or column alignment confirmed the boundary",
                    table.id
                ),
            ));
        }
        if table.rows_removed > 0 {
            table.diagnostics.push(Diagnostic::new(
                DiagnosticKind::TableRowsTrimmed,
                format!(
                    "table {}: {} of {} candidate rows removed ({})",
                    table.id,
                    table.rows_removed,
                    before,
                    status.method()
                ),
            ));
        }

        log::debug!(
            "table {}: {} ({} -> {} rows)",
            table.id,
            status.as_str(),
            before,
            table.rows.len()
        );

        ValidationOutcome {
            status,
            validated_bbox,
            rows_removed: table.rows_removed,
        }
    }

    /// Validate every table candidate on the page.
    pub fn validate_page(&self, page: &mut Page, lines: &[Line]) {
        for table in page.tables.iter_mut() {
            self.validate(table, &page.drawings, lines);
        }
    }

    /// Tier cascade; returns the status, boundary and indices of rows to keep.
    fn run_tiers(
        &self,
        table: &Table,
        drawings: &[Drawing],
        lines: &[Line],
    ) -> (ValidationStatus, Option<BoundingBox>, Vec<usize>) {
        let all: Vec<usize> = (0..table.rows.len()).collect();

        let ruling = collect_ruling(&table.bbox, drawings, &self.config);
        if let Some(structure) = ruling.structure_bbox() {
            let (bbox, kept) = self.trim_to(table, structure);
            return (ValidationStatus::HasStructure, Some(bbox), kept);
        }
        log::debug!(
            "table {}: tier 1 found {} horizontal / {} vertical lines",
            table.id,
            ruling.horizontal.len(),
            ruling.vertical.len()
        );

        match validate_alignment(&table.bbox, lines, &self.config) {
            Ok(validated) => {
                let (bbox, kept) = self.trim_to(table, validated);
                (ValidationStatus::TextValidated, Some(bbox), kept)
            }
            Err(reason) => {
                log::debug!("table {}: tier 2 rejected ({:?})", table.id, reason);
                (ValidationStatus::TextOnly, None, all)
            }
        }
    }

    /// Rows to keep for a confirmed boundary, and the boundary to record.
    ///
    /// A boundary holding none of the rows would empty the table; every
    /// row is kept instead and the recorded boundary widens to the
    /// candidate plus all cells, so the kept rows stay excluded from the
    /// text flow.
    fn trim_to(&self, table: &Table, bbox: BoundingBox) -> (BoundingBox, Vec<usize>) {
        let kept = self.rows_within(&table.rows, &bbox);
        if !kept.is_empty() {
            return (bbox, kept);
        }
        log::debug!("table {}: boundary holds no rows, keeping the candidate", table.id);
        let cells = table.rows.iter().flat_map(|r| r.cells.iter().map(|c| &c.bbox));
        let widened = BoundingBox::union_all(cells).map_or(table.bbox, |b| b.union(&table.bbox));
        (widened, (0..table.rows.len()).collect())
    }

    /// Rows whose vertical center lies within the boundary's y-range.
    fn rows_within(&self, rows: &[TableRow], bbox: &BoundingBox) -> Vec<usize> {
        let slack = self.config.row_center_slack;
        rows.iter()
            .enumerate()
            .filter(|(_, row)| {
                row.center_y()
                    .map_or(false, |y| y >= bbox.y0 - slack && y <= bbox.y1 + slack)
            })
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FontWeight, LineId, Segment, TableCell};

    fn row_at(y: f32, texts: &[&str]) -> TableRow {
        TableRow::new(
            texts
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    let x = 60.0 + i as f32 * 150.0;
                    TableCell::new(BoundingBox::new(x, y, x + 140.0, y + 12.0), *t)
                })
                .collect(),
        )
    }

    fn line(x0: f32, y0: f32) -> Line {
        Line {
            id: LineId(0),
            fragments: vec![],
            bbox: BoundingBox::new(x0, y0, x0 + 40.0, y0 + 10.0),
            baseline: y0 + 10.0,
            text: "x".to_string(),
            font_family: "Times".to_string(),
            size: 10.0,
            weight: FontWeight::Normal,
            has_script: false,
        }
    }

    #[test]
    fn test_tier1_trims_caption_and_footnote() {
        // R1 caption above the grid, R2..R5 inside, R6 footnote below
        let rows = vec![
            row_at(100.0, &["Table 4 shows the totals for each region", "", ""]),
            row_at(130.0, &["Region", "Q1", "Q2"]),
            row_at(150.0, &["North", "10", "12"]),
            row_at(170.0, &["South", "8", "9"]),
            row_at(190.0, &["East", "7", "11"]),
            row_at(220.0, &["* Provisional figures; see appendix for revisions", "", ""]),
        ];
        let mut table = Table::new("p1_table1", BoundingBox::new(55.0, 95.0, 510.0, 240.0), rows);
        let drawings = vec![Drawing::stroke(vec![
            Segment::new(60.0, 127.0, 500.0, 127.0),
            Segment::new(60.0, 147.0, 500.0, 147.0),
            Segment::new(60.0, 167.0, 500.0, 167.0),
            Segment::new(60.0, 205.0, 500.0, 205.0),
            Segment::new(60.0, 127.0, 60.0, 205.0),
            Segment::new(280.0, 127.0, 280.0, 205.0),
            Segment::new(500.0, 127.0, 500.0, 205.0),
        ])];

        let outcome = TableValidator::new().validate(&mut table, &drawings, &[]);
        assert_eq!(outcome.status, ValidationStatus::HasStructure);
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[0].cells[0].text, "Region");
        assert_eq!(table.rows[3].cells[0].text, "East");
        assert!(table.has_header);
        assert_eq!(table.rows_removed, 2);
        assert_eq!(table.exclusion_zone(), BoundingBox::new(60.0, 127.0, 500.0, 205.0));
        assert!(table
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::TableRowsTrimmed));
    }

    #[test]
    fn test_tier3_when_nothing_confirms() {
        let rows = vec![row_at(100.0, &["a", "b"]), row_at(120.0, &["c", "d"])];
        let mut table = Table::new("t", BoundingBox::new(55.0, 95.0, 400.0, 140.0), rows);
        let outcome = TableValidator::new().validate(&mut table, &[], &[]);
        assert_eq!(outcome.status, ValidationStatus::TextOnly);
        assert_eq!(table.rows.len(), 2);
        assert!(table.validated_bbox.is_none());
        assert_eq!(table.diagnostics.len(), 1);
        assert_eq!(table.diagnostics[0].kind, DiagnosticKind::TableUnvalidated);
    }

    #[test]
    fn test_tier2_used_when_grid_incomplete() {
        let rows = vec![
            row_at(103.0, &["Values by column", "", ""]),
            row_at(130.0, &["x", "y", "z"]),
            row_at(150.0, &["1", "2", "3"]),
            row_at(170.0, &["4", "5", "6"]),
            row_at(190.0, &["7", "8", "9"]),
        ];
        let mut table = Table::new("t", BoundingBox::new(60.0, 100.0, 520.0, 230.0), rows);
        // one horizontal line only: not a grid
        let drawings = vec![Drawing::stroke(vec![Segment::new(60.0, 127.0, 500.0, 127.0)])];
        let mut lines = vec![line(100.0, 105.0)];
        for y in [130.0, 150.0, 170.0, 190.0] {
            lines.extend([line(68.0, y), line(255.0, y), line(434.0, y)]);
        }

        let outcome = TableValidator::new().validate(&mut table, &drawings, &lines);
        assert_eq!(outcome.status, ValidationStatus::TextValidated);
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[0].cells[0].text, "x");
    }

    #[test]
    fn test_grid_that_would_empty_table_keeps_rows() {
        let rows = vec![row_at(400.0, &["a", "b"]), row_at(420.0, &["c", "d"])];
        let mut table = Table::new("t", BoundingBox::new(55.0, 95.0, 400.0, 440.0), rows);
        let drawings = vec![Drawing::stroke(vec![
            Segment::new(60.0, 100.0, 300.0, 100.0),
            Segment::new(60.0, 120.0, 300.0, 120.0),
            Segment::new(60.0, 100.0, 60.0, 120.0),
            Segment::new(300.0, 100.0, 300.0, 120.0),
        ])];
        let outcome = TableValidator::new().validate(&mut table, &drawings, &[]);
        assert_eq!(outcome.status, ValidationStatus::HasStructure);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows_removed, 0);
        // the zone must still cover the kept rows
        assert_eq!(table.exclusion_zone(), BoundingBox::new(55.0, 95.0, 400.0, 440.0));
    }

    #[test]
    fn test_revalidation_starts_from_extracted_rows() {
        let rows = vec![
            row_at(100.0, &["Table 4 shows the totals for each region", "", ""]),
            row_at(130.0, &["Region", "Q1", "Q2"]),
            row_at(150.0, &["North", "10", "12"]),
        ];
        let mut table = Table::new("t", BoundingBox::new(55.0, 95.0, 510.0, 170.0), rows);
        let validator = TableValidator::new();

        validator.validate(&mut table, &[], &[]);
        let first = table.clone();
        validator.validate(&mut table, &[], &[]);

        assert_eq!(table.rows, first.rows);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows_removed, 1);
        assert_eq!(table.diagnostics, first.diagnostics);
        assert_eq!(table.diagnostics.len(), 2);
    }

    #[test]
    fn test_config_validate() {
        let mut config = TableValidatorConfig::default();
        assert!(config.validate().is_ok());
        config.min_area_ratio = 0.99;
        assert!(config.validate().is_err());
    }
}
