//! Tier 1: confirm a table boundary from drawn ruling lines.

use crate::model::{BoundingBox, Drawing};

use super::TableValidatorConfig;

/// Ruling lines found around a candidate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ruling {
    /// (x_start, x_end, y)
    pub horizontal: Vec<(f32, f32, f32)>,
    /// (y_start, y_end, x)
    pub vertical: Vec<(f32, f32, f32)>,
}

impl Ruling {
    /// At least two lines on each axis.
    pub fn is_grid(&self) -> bool {
        self.horizontal.len() >= 2 && self.vertical.len() >= 2
    }

    /// Box spanned by the outermost lines; `None` unless a grid.
    pub fn structure_bbox(&self) -> Option<BoundingBox> {
        if !self.is_grid() {
            return None;
        }
        let min_x = self.vertical.iter().map(|v| v.2).fold(f32::MAX, f32::min);
        let max_x = self.vertical.iter().map(|v| v.2).fold(f32::MIN, f32::max);
        let min_y = self.horizontal.iter().map(|h| h.2).fold(f32::MAX, f32::min);
        let max_y = self.horizontal.iter().map(|h| h.2).fold(f32::MIN, f32::max);
        Some(BoundingBox::new(min_x, min_y, max_x, max_y))
    }
}

/// Collect unfilled, axis-aligned segments touching the candidate box.
///
/// A segment is kept when either endpoint lies within the box grown by
/// `drawing_margin`. Filled drawings are page decoration and are ignored.
pub fn collect_ruling(bbox: &BoundingBox, drawings: &[Drawing], config: &TableValidatorConfig) -> Ruling {
    let area = bbox.expand(config.drawing_margin);
    let mut ruling = Ruling::default();

    for drawing in drawings.iter().filter(|d| !d.is_filled()) {
        for seg in &drawing.segments {
            let touches = area.contains_point(seg.x0, seg.y0) || area.contains_point(seg.x1, seg.y1);
            if !touches {
                continue;
            }
            if seg.dy() < config.axis_tolerance {
                ruling.horizontal.push((
                    seg.x0.min(seg.x1),
                    seg.x0.max(seg.x1),
                    (seg.y0 + seg.y1) / 2.0,
                ));
            } else if seg.dx() < config.axis_tolerance {
                ruling.vertical.push((
                    seg.y0.min(seg.y1),
                    seg.y0.max(seg.y1),
                    (seg.x0 + seg.x1) / 2.0,
                ));
            }
        }
    }
    ruling
}
