//! Layout builder configuration.

use serde::{Deserialize, Serialize};

/// Tolerances for line, block and column formation.
///
/// Distances are in points unless the name says `factor` (multiple of
/// the font size) or `ratio` (fraction of the page width).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Slack when testing whether a fragment lies inside an exclusion zone
    pub exclusion_tolerance: f32,
    /// Max baseline distance for fragments in one row
    pub baseline_tolerance: f32,
    /// Max baseline distance for a super/subscript to join a row
    pub script_baseline_tolerance: f32,
    /// Horizontal gap (x font size) that splits a row into separate lines
    pub word_gap_factor: f32,
    /// Max vertical gap (x font size) between lines of one block
    pub line_gap_factor: f32,
    /// Max font size difference inside a block
    pub size_tolerance: f32,
    /// Max left-edge drift between body lines of a block
    pub indent_tolerance: f32,
    /// How far the first line may sit right of the body lines
    pub first_line_indent_max: f32,
    /// How far body lines may sit right of a list marker line
    pub hanging_indent_max: f32,
    /// Gap between block x0 values that starts a new column
    pub column_gap_ratio: f32,
    /// Clusters smaller than this fold into an enclosing column
    pub min_column_blocks: usize,
    /// Blocks at least this wide span all columns
    pub full_width_ratio: f32,
    /// Share of split baseline rows that suggests columns were missed
    pub side_by_side_ratio: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            exclusion_tolerance: 2.0,
            baseline_tolerance: 3.0,
            script_baseline_tolerance: 6.0,
            word_gap_factor: 1.5,
            line_gap_factor: 0.8,
            size_tolerance: 0.5,
            indent_tolerance: 4.0,
            first_line_indent_max: 40.0,
            hanging_indent_max: 40.0,
            column_gap_ratio: 0.12,
            min_column_blocks: 2,
            full_width_ratio: 0.6,
            side_by_side_ratio: 0.3,
        }
    }
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the baseline tolerance for row grouping.
    pub fn with_baseline_tolerance(mut self, tolerance: f32) -> Self {
        self.baseline_tolerance = tolerance;
        self
    }

    /// Set the column gap as a fraction of the page width.
    pub fn with_column_gap_ratio(mut self, ratio: f32) -> Self {
        self.column_gap_ratio = ratio;
        self
    }

    /// Set the full-width threshold as a fraction of the page width.
    pub fn with_full_width_ratio(mut self, ratio: f32) -> Self {
        self.full_width_ratio = ratio;
        self
    }

    /// Set the max vertical gap between lines of a block.
    pub fn with_line_gap_factor(mut self, factor: f32) -> Self {
        self.line_gap_factor = factor;
        self
    }

    /// Reject values that would make the builder misbehave.
    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("baseline_tolerance", self.baseline_tolerance),
            ("word_gap_factor", self.word_gap_factor),
            ("line_gap_factor", self.line_gap_factor),
            ("column_gap_ratio", self.column_gap_ratio),
            ("full_width_ratio", self.full_width_ratio),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("layout.{} must be positive, got {}", name, value));
            }
        }
        if self.full_width_ratio > 1.0 {
            return Err("layout.full_width_ratio must not exceed 1.0".to_string());
        }
        Ok(())
    }
}
