//! Caption recognition and linking to figures and tables.

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::{BlockId, BoundingBox, CaptionTarget, MediaIdx, Page, Role, TableIdx};

use super::HeuristicsConfig;

/// What a caption pattern announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionKind {
    Figure,
    Table,
}

/// A parsed caption label such as `Figure 3.2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionLabel {
    pub kind: CaptionKind,
    pub number: String,
}

fn figure_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:figure|fig\.|fig|image|plate|diagram|illustration|photo|exhibit|chart|graph|map|drawing|sketch)\s*(\d+(?:[.\-]\d+)?[a-z]?)\s*[.:\-–—]?",
        )
        .expect("valid figure caption pattern")
    })
}

fn table_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:table|tbl\.|tbl|tableau|tabelle|schedule)\s*(\d+(?:[.\-]\d+)?[a-z]?)\s*[.:\-–—]?")
            .expect("valid table caption pattern")
    })
}

/// Parse a caption label at the start of `text`.
pub fn parse_caption(text: &str) -> Option<CaptionLabel> {
    let text = text.trim_start();
    for (kind, re) in [
        (CaptionKind::Figure, figure_pattern()),
        (CaptionKind::Table, table_pattern()),
    ] {
        if let Some(caps) = re.captures(text) {
            let number = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
            return Some(CaptionLabel { kind, number });
        }
    }
    None
}

/// Edge-to-edge vertical distance, or `None` without horizontal overlap.
fn caption_distance(caption: &BoundingBox, target: &BoundingBox) -> Option<f32> {
    if caption.horizontal_overlap(target) <= 0.0 {
        return None;
    }
    Some(caption.vertical_gap(target))
}

#[derive(Debug)]
struct Pairing {
    distance: f32,
    order: u32,
    block: BlockId,
    target: CaptionTarget,
}

/// Link caption blocks on one page to the nearest figure or table.
///
/// Candidate pairs are taken closest first, ties broken by reading
/// order; each block and each target is linked at most once.
pub fn link_captions(page: &mut Page, config: &HeuristicsConfig) -> usize {
    let mut pairs: Vec<Pairing> = Vec::new();

    for block in page.ordered_blocks() {
        if block.role.is_some() {
            continue;
        }
        let Some(label) = parse_caption(&block.text) else {
            continue;
        };
        let order = block.reading_order.unwrap_or(u32::MAX);
        match label.kind {
            CaptionKind::Figure => {
                for (i, media) in page.media.iter().enumerate() {
                    if media.is_form_render() {
                        continue;
                    }
                    if let Some(distance) = caption_distance(&block.bbox, &media.bbox) {
                        if distance <= config.figure_caption_distance {
                            pairs.push(Pairing {
                                distance,
                                order,
                                block: block.id,
                                target: CaptionTarget::Figure(MediaIdx(i as u32)),
                            });
                        }
                    }
                }
            }
            CaptionKind::Table => {
                for (i, table) in page.tables.iter().enumerate() {
                    if let Some(distance) = caption_distance(&block.bbox, &table.exclusion_zone()) {
                        if distance <= config.table_caption_distance {
                            pairs.push(Pairing {
                                distance,
                                order,
                                block: block.id,
                                target: CaptionTarget::Table(TableIdx(i as u32)),
                            });
                        }
                    }
                }
            }
        }
    }

    pairs.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(Ordering::Equal)
            .then(a.order.cmp(&b.order))
            .then(a.block.cmp(&b.block))
    });

    let mut linked_blocks: Vec<BlockId> = Vec::new();
    let mut linked_targets: Vec<CaptionTarget> = Vec::new();
    for pair in pairs {
        if linked_blocks.contains(&pair.block) || linked_targets.contains(&pair.target) {
            continue;
        }
        page.block_mut(pair.block).role = Some(Role::Caption { target: pair.target });
        if let CaptionTarget::Table(idx) = pair.target {
            page.tables[idx.0 as usize].caption = Some(pair.block);
        }
        log::debug!(
            "page {}: block {} captions {:?} at {:.1}pt",
            page.index,
            pair.block.0,
            pair.target,
            pair.distance
        );
        linked_blocks.push(pair.block);
        linked_targets.push(pair.target);
    }
    linked_blocks.len()
}
