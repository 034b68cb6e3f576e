//! Heading detection and level assignment.
//!
//! Four typographic signals are read per block: a font size above the
//! body size, bold type on every line, a single short line, and extra
//! whitespace above. Levels come from ranking the distinct styles of the
//! candidates, largest first.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::model::{Block, BlockId, BoundingBox, Diagnostic, DiagnosticKind, Page, Role};

use super::captions::parse_caption;
use super::lists::parse_marker;
use super::HeuristicsConfig;

/// Typographic style used to rank heading candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StyleKey {
    /// Font size in half points
    pub half_points: i32,
    pub bold: bool,
}

impl StyleKey {
    pub fn of(block: &Block) -> Self {
        Self {
            half_points: (block.size * 2.0).round() as i32,
            bold: block.all_bold,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadingSignals {
    pub size: bool,
    pub bold: bool,
    pub short: bool,
    pub spacing: bool,
}

impl HeadingSignals {
    pub fn is_candidate(&self) -> bool {
        self.size || (self.bold && (self.short || self.spacing))
    }
}

#[derive(Debug, Clone)]
pub struct HeadingCandidate {
    pub block: BlockId,
    pub key: StyleKey,
    pub signals: HeadingSignals,
    pub line_count: usize,
}

impl HeadingCandidate {
    /// Tagged as a heading but worth a second look.
    pub fn is_ambiguous(&self) -> bool {
        !self.signals.size || self.line_count > 2
    }
}

fn median(mut values: Vec<f32>) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Whitespace between the block and the nearest block above it that
/// shares part of its x-range. `None` when nothing is above.
fn gap_above(block: &Block, blocks: &[Block]) -> Option<f32> {
    blocks
        .iter()
        .filter(|other| other.id != block.id)
        .filter(|other| other.bbox.horizontal_overlap(&block.bbox) > 0.0)
        .filter(|other| other.bbox.y1 <= block.bbox.y0 + 0.5)
        .map(|other| (block.bbox.y0 - other.bbox.y1).max(0.0))
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
}

fn content_width(page: &Page) -> f32 {
    BoundingBox::union_all(page.blocks.iter().map(|b| &b.bbox))
        .map(|b| b.width())
        .filter(|w| *w > 0.0)
        .unwrap_or(page.width)
}

/// Signals and candidacy for every block on the page.
pub fn find_candidates(page: &Page, body_size: Option<f32>, config: &HeuristicsConfig) -> Vec<HeadingCandidate> {
    let gaps: Vec<Option<f32>> = page.blocks.iter().map(|b| gap_above(b, &page.blocks)).collect();
    let median_gap = median(gaps.iter().flatten().copied().filter(|g| *g > 0.0).collect());
    let first = page.reading_order.first().copied();
    let full_width = content_width(page);
    // A column made only of short lines is no measure of shortness.
    let min_column_width = full_width / page.columns.len().max(1) as f32;
    let has_targets = !page.media.is_empty() || !page.tables.is_empty();

    let mut candidates = Vec::new();
    for block in page.ordered_blocks() {
        if block.role.is_some() {
            continue;
        }
        let size = body_size.map_or(false, |body| block.size >= body + config.size_margin);

        let char_count = block.text.chars().count();
        if block.line_count() > config.max_heading_lines
            || char_count > config.max_heading_chars
            || !block.text.chars().any(char::is_alphabetic)
            || (!size && parse_marker(&block.text).is_some())
            || (has_targets && parse_caption(&block.text).is_some())
        {
            continue;
        }

        let column_width = block
            .column
            .and_then(|c| page.columns.iter().find(|col| col.id == c))
            .map(|col| col.width().max(min_column_width))
            .unwrap_or(full_width);
        let spacing = match (gaps[block.id.0 as usize], median_gap) {
            _ if first == Some(block.id) => true,
            (None, _) => true,
            (Some(gap), Some(median)) => gap >= config.spacing_ratio * median,
            (Some(_), None) => false,
        };
        let signals = HeadingSignals {
            size,
            bold: block.all_bold,
            short: block.line_count() == 1 && block.bbox.width() < config.short_line_ratio * column_width,
            spacing,
        };

        if signals.is_candidate() {
            candidates.push(HeadingCandidate {
                block: block.id,
                key: StyleKey::of(block),
                signals,
                line_count: block.line_count(),
            });
        }
    }
    candidates
}

/// Map each distinct style to a level, largest and boldest first.
pub fn rank_levels<I>(keys: I, max_level: u8) -> BTreeMap<StyleKey, u8>
where
    I: IntoIterator<Item = StyleKey>,
{
    let mut distinct: Vec<StyleKey> = keys.into_iter().collect();
    distinct.sort();
    distinct.dedup();
    distinct
        .into_iter()
        .rev()
        .enumerate()
        .map(|(rank, key)| (key, ((rank + 1).min(max_level as usize)) as u8))
        .collect()
}

/// Tag candidates with their level, adding an ambiguity diagnostic where due.
pub fn apply_headings(page: &mut Page, candidates: &[HeadingCandidate], levels: &BTreeMap<StyleKey, u8>) {
    for candidate in candidates {
        let level = levels.get(&candidate.key).copied().unwrap_or(1);
        let block = page.block_mut(candidate.block);
        block.role = Some(Role::Heading { level });
        if candidate.is_ambiguous() {
            let s = candidate.signals;
            block.diagnostics.push(Diagnostic::new(
                DiagnosticKind::HeadingAmbiguous,
                format!(
                    "level {} heading from weak signals (size={}, bold={}, short={}, spacing={}, lines={})",
                    level, s.size, s.bold, s.short, s.spacing, candidate.line_count
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(size: f32, bold: bool) -> StyleKey {
        StyleKey {
            half_points: (size * 2.0).round() as i32,
            bold,
        }
    }

    #[test]
    fn test_rank_levels() {
        let levels = rank_levels(
            vec![key(14.0, true), key(18.0, true), key(14.0, false), key(14.0, true), key(14.2, true)],
            6,
        );
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[&key(18.0, true)], 1);
        assert_eq!(levels[&key(14.0, true)], 2);
        assert_eq!(levels[&key(14.0, false)], 3);
    }

    #[test]
    fn test_levels_capped() {
        let keys: Vec<StyleKey> = (0..9).map(|i| key(12.0 + i as f32, false)).collect();
        let levels = rank_levels(keys, 6);
        assert_eq!(levels[&key(20.0, false)], 1);
        assert_eq!(levels[&key(12.0, false)], 6);
        assert_eq!(levels[&key(13.0, false)], 6);
    }

    #[test]
    fn test_candidacy() {
        let weak = HeadingSignals {
            short: true,
            spacing: true,
            ..Default::default()
        };
        assert!(!weak.is_candidate());
        let bold_short = HeadingSignals {
            bold: true,
            short: true,
            ..Default::default()
        };
        assert!(bold_short.is_candidate());
        let bold_only = HeadingSignals {
            bold: true,
            ..Default::default()
        };
        assert!(!bold_only.is_candidate());
    }

    #[test]
    fn test_median() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(vec![4.0, 1.0]), Some(2.5));
        assert_eq!(median(vec![]), None);
    }
}
