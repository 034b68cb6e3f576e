//! Tier 2: confirm a table boundary from text alignment.

use std::cmp::Ordering;

use crate::model::{BoundingBox, Line};

use super::TableValidatorConfig;

/// A run of nearby 1-D positions.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionCluster {
    pub min: f32,
    pub max: f32,
    pub count: usize,
    sum: f32,
}

impl PositionCluster {
    fn new(value: f32) -> Self {
        Self {
            min: value,
            max: value,
            count: 1,
            sum: value,
        }
    }

    pub fn center(&self) -> f32 {
        self.sum / self.count as f32
    }

    pub fn contains(&self, value: f32, tolerance: f32) -> bool {
        value >= self.min - tolerance && value <= self.max + tolerance
    }
}

/// Sort values and chain them into clusters: a value joins the current
/// cluster when it is within `tolerance` of the previous value.
pub fn cluster_positions(values: &[f32], tolerance: f32) -> Vec<PositionCluster> {
    let mut sorted: Vec<f32> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mut clusters: Vec<PositionCluster> = Vec::new();
    for value in sorted {
        let joins = clusters
            .last()
            .map_or(false, |c| value - c.max <= tolerance);
        if joins {
            if let Some(c) = clusters.last_mut() {
                c.max = value;
                c.count += 1;
                c.sum += value;
            }
        } else {
            clusters.push(PositionCluster::new(value));
        }
    }
    clusters
}

/// Why tier 2 did not confirm a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentRejection {
    TooFewColumns,
    TooFewRows,
    ShrinksTooMuch,
    ShrinksTooLittle,
}

/// Validated boundary from the text lines inside `bbox`.
pub fn validate_alignment(
    bbox: &BoundingBox,
    lines: &[Line],
    config: &TableValidatorConfig,
) -> Result<BoundingBox, AlignmentRejection> {
    let inside: Vec<&Line> = lines.iter().filter(|l| l.bbox.intersects(bbox)).collect();

    let xs: Vec<f32> = inside.iter().map(|l| l.bbox.x0).collect();
    let columns: Vec<PositionCluster> = cluster_positions(&xs, config.column_tolerance)
        .into_iter()
        .filter(|c| c.count >= config.min_column_hits)
        .collect();
    if columns.len() < 2 {
        return Err(AlignmentRejection::TooFewColumns);
    }

    // Only lines aligned with a column vote for rows.
    let ys: Vec<f32> = inside
        .iter()
        .filter(|l| columns.iter().any(|c| c.contains(l.bbox.x0, config.column_tolerance)))
        .map(|l| l.bbox.y0)
        .collect();
    let rows = cluster_positions(&ys, config.row_tolerance);
    if rows.len() < 2 {
        return Err(AlignmentRejection::TooFewRows);
    }

    let left = columns.iter().map(|c| c.center()).fold(f32::MAX, f32::min);
    let top = rows.iter().map(|r| r.center()).fold(f32::MAX, f32::min);
    let bottom = rows.iter().map(|r| r.center()).fold(f32::MIN, f32::max);
    let validated = BoundingBox::new(
        left - config.column_margin,
        top - config.row_top_margin,
        bbox.x1,
        bottom + config.row_bottom_margin,
    )
    .clamp_to(bbox);

    let original = bbox.area();
    let ratio = if original > 0.0 {
        validated.area() / original
    } else {
        1.0
    };
    log::debug!(
        "tier 2: {} columns, {} rows, area ratio {:.2}",
        columns.len(),
        rows.len(),
        ratio
    );
    if ratio < config.min_area_ratio {
        return Err(AlignmentRejection::ShrinksTooMuch);
    }
    if ratio > config.max_area_ratio {
        return Err(AlignmentRejection::ShrinksTooLittle);
    }
    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FontWeight, LineId};

    fn line(x0: f32, y0: f32, x1: f32) -> Line {
        Line {
            id: LineId(0),
            fragments: vec![],
            bbox: BoundingBox::new(x0, y0, x1, y0 + 10.0),
            baseline: y0 + 10.0,
            text: String::new(),
            font_family: "Times".to_string(),
            size: 10.0,
            weight: FontWeight::Normal,
            has_script: false,
        }
    }

    #[test]
    fn test_cluster_positions() {
        let clusters = cluster_positions(&[68.0, 255.0, 69.5, 434.0, 257.0, 67.0], 3.0);
        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[0].count, 3);
        assert_eq!(clusters[0].min, 67.0);
        assert_eq!(clusters[1].count, 2);
    }

    #[test]
    fn test_chained_clustering() {
        // each step is within tolerance, so one cluster
        let clusters = cluster_positions(&[0.0, 2.5, 5.0, 7.5], 3.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].center(), 3.75);
    }

    fn grid_lines(caption: bool) -> Vec<Line> {
        let mut lines = Vec::new();
        if caption {
            lines.push(line(100.0, 105.0, 400.0));
        }
        for y in [130.0, 150.0, 170.0, 190.0] {
            lines.push(line(68.0, y, 120.0));
            lines.push(line(255.0, y, 300.0));
            lines.push(line(434.0, y, 480.0));
        }
        lines
    }

    #[test]
    fn test_caption_trimmed() {
        let bbox = BoundingBox::new(60.0, 100.0, 520.0, 230.0);
        let validated =
            validate_alignment(&bbox, &grid_lines(true), &TableValidatorConfig::default()).unwrap();
        assert_eq!(validated, BoundingBox::new(63.0, 128.0, 520.0, 200.0));
    }

    #[test]
    fn test_single_column_rejected() {
        let bbox = BoundingBox::new(60.0, 100.0, 520.0, 230.0);
        let lines: Vec<Line> = [130.0, 150.0, 170.0].iter().map(|y| line(68.0, *y, 400.0)).collect();
        assert_eq!(
            validate_alignment(&bbox, &lines, &TableValidatorConfig::default()),
            Err(AlignmentRejection::TooFewColumns)
        );
    }

    #[test]
    fn test_tight_candidate_not_worth_it() {
        let bbox = BoundingBox::new(63.0, 128.0, 520.0, 200.0);
        assert_eq!(
            validate_alignment(&bbox, &grid_lines(false), &TableValidatorConfig::default()),
            Err(AlignmentRejection::ShrinksTooLittle)
        );
    }

    #[test]
    fn test_oversized_candidate_rejected() {
        let bbox = BoundingBox::new(60.0, 100.0, 520.0, 700.0);
        assert_eq!(
            validate_alignment(&bbox, &grid_lines(false), &TableValidatorConfig::default()),
            Err(AlignmentRejection::ShrinksTooMuch)
        );
    }
}
