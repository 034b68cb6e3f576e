//! Block formation: consecutive compatible lines become one block.

use std::collections::BTreeMap;

use crate::heuristics::lists::parse_marker;
use crate::model::{Alignment, Block, BlockId, BoundingBox, FontWeight, Line, LineId};

use super::LayoutConfig;

/// A block still accepting lines.
struct OpenBlock {
    lines: Vec<usize>,
    bbox: BoundingBox,
    last: BoundingBox,
    last_baseline: f32,
    first_x0: f32,
    /// Left edge of the second line, once there is one
    body_x0: Option<f32>,
    starts_with_marker: bool,
    family: String,
    size: f32,
    weight: FontWeight,
}

impl OpenBlock {
    fn start(index: usize, line: &Line, marker: bool) -> Self {
        Self {
            lines: vec![index],
            bbox: line.bbox,
            last: line.bbox,
            last_baseline: line.baseline,
            first_x0: line.bbox.x0,
            body_x0: None,
            starts_with_marker: marker,
            family: line.font_family.clone(),
            size: line.size,
            weight: line.weight,
        }
    }

    fn push(&mut self, index: usize, line: &Line) {
        if self.body_x0.is_none() {
            self.body_x0 = Some(line.bbox.x0);
        }
        self.lines.push(index);
        self.bbox = self.bbox.union(&line.bbox);
        self.last = line.bbox;
        self.last_baseline = line.baseline;
    }

    /// Too far above `line` for anything below to join.
    fn is_stale(&self, line: &Line, config: &LayoutConfig) -> bool {
        line.bbox.y0 - self.last.y1 > config.line_gap_factor * line.size.max(self.size)
    }

    fn accepts(&self, line: &Line, config: &LayoutConfig) -> bool {
        let gap = line.bbox.y0 - self.last.y1;
        if gap > config.line_gap_factor * line.size.max(self.size) {
            return false;
        }
        if line.baseline - self.last_baseline <= config.baseline_tolerance {
            return false;
        }
        if self.bbox.horizontal_overlap(&line.bbox) <= 0.0 {
            return false;
        }
        if line.font_family != self.family
            || (line.size - self.size).abs() > config.size_tolerance
            || line.weight != self.weight
        {
            return false;
        }
        self.indent_compatible(line.bbox.x0, config)
    }

    fn indent_compatible(&self, x0: f32, config: &LayoutConfig) -> bool {
        match self.body_x0 {
            Some(body) => (x0 - body).abs() <= config.indent_tolerance,
            None => {
                let shift = x0 - self.first_x0;
                let max_right = if self.starts_with_marker {
                    config.hanging_indent_max
                } else {
                    config.indent_tolerance
                };
                shift <= max_right && -shift <= config.first_line_indent_max
            }
        }
    }
}

/// Group lines into blocks.
///
/// Lines must be in (baseline, x0) order. A line joins the first open
/// block that accepts it, so side-by-side columns build their blocks
/// independently. A line opening with a list marker always starts a block.
pub fn form_blocks(lines: &[Line], config: &LayoutConfig) -> Vec<Block> {
    let mut open: Vec<OpenBlock> = Vec::new();
    let mut done: Vec<OpenBlock> = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let (stale, live): (Vec<_>, Vec<_>) =
            open.into_iter().partition(|b| b.is_stale(line, config));
        done.extend(stale);
        open = live;

        let marker = parse_marker(&line.text).is_some();
        let target = if marker {
            None
        } else {
            open.iter().position(|b| b.accepts(line, config))
        };
        match target {
            Some(i) => open[i].push(index, line),
            None => open.push(OpenBlock::start(index, line, marker)),
        }
    }
    done.extend(open);

    // Block ids follow the position of each block's first line.
    done.sort_by_key(|b| b.lines[0]);
    done.into_iter()
        .enumerate()
        .map(|(i, open)| finish_block(BlockId(i as u32), open, lines, config))
        .collect()
}

fn finish_block(id: BlockId, open: OpenBlock, lines: &[Line], config: &LayoutConfig) -> Block {
    let members: Vec<&Line> = open.lines.iter().map(|i| &lines[*i]).collect();

    let text = members
        .iter()
        .map(|l| l.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut sizes: BTreeMap<i32, usize> = BTreeMap::new();
    for line in &members {
        *sizes.entry((line.size * 10.0).round() as i32).or_insert(0) += line.text.len();
    }
    let size = sizes
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        .map(|(k, _)| *k as f32 / 10.0)
        .unwrap_or(open.size);

    Block {
        id,
        lines: members.iter().map(|l| l.id).collect::<Vec<LineId>>(),
        bbox: open.bbox,
        indent: 0.0,
        alignment: detect_alignment(&members, config.indent_tolerance),
        column: None,
        reading_order: None,
        text,
        font_family: open.family,
        size,
        weight: open.weight,
        all_bold: members.iter().all(|l| l.is_bold()),
        role: None,
        continuation_target: None,
        diagnostics: Vec::new(),
    }
}

/// Alignment from the spread of line edges. The last line is left out of
/// the right-edge test since paragraphs end short.
fn detect_alignment(lines: &[&Line], tolerance: f32) -> Alignment {
    if lines.len() < 2 {
        return Alignment::Left;
    }
    let left = spread(lines.iter().map(|l| l.bbox.x0));
    let right_all = spread(lines.iter().map(|l| l.bbox.x1));
    let right_body = spread(lines[..lines.len() - 1].iter().map(|l| l.bbox.x1));
    let center = spread(lines.iter().map(|l| l.bbox.center_x()));

    if left <= tolerance && right_body <= tolerance && lines.len() > 2 {
        Alignment::Justified
    } else if left <= tolerance {
        Alignment::Left
    } else if center <= tolerance {
        Alignment::Center
    } else if right_all <= tolerance {
        Alignment::Right
    } else {
        Alignment::Left
    }
}

fn spread(values: impl Iterator<Item = f32>) -> f32 {
    let (min, max) = values.fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    max - min
}
