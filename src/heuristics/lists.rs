//! List item detection and grouping.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{Block, ListId, MarkerKind, Page, Role};

use super::HeuristicsConfig;

struct MarkerPatterns {
    bullet: Regex,
    decimal: Regex,
    roman: Regex,
    strict_roman: Regex,
    alpha: Regex,
}

fn patterns() -> &'static MarkerPatterns {
    static PATTERNS: OnceLock<MarkerPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| MarkerPatterns {
        bullet: Regex::new(r"^([•●○■□▪▫·*–—→⇒▸►-])\s+\S").expect("valid bullet pattern"),
        decimal: Regex::new(r"^(?:\d{1,3}[.)]|\(\d{1,3}\))\s+\S").expect("valid decimal pattern"),
        roman: Regex::new(r"^\(?([ivxlcdm]+|[IVXLCDM]+)[.)]\s+\S").expect("valid roman pattern"),
        strict_roman: Regex::new(r"^m{0,3}(?:cm|cd|d?c{0,3})(?:xc|xl|l?x{0,3})(?:ix|iv|v?i{0,3})$")
            .expect("valid roman numeral"),
        alpha: Regex::new(r"^(?:([a-zA-Z])[.)]|\(([a-zA-Z])\))\s+\S").expect("valid alpha pattern"),
    })
}

/// Marker kind of a line starting with a list marker.
///
/// The marker must be the very first character and be followed by
/// whitespace and content. Single letters other than `i`, `v` and `x`
/// read as alphabetic markers.
pub fn parse_marker(text: &str) -> Option<MarkerKind> {
    let p = patterns();

    if let Some(caps) = p.bullet.captures(text) {
        let glyph = caps.get(1)?.as_str().chars().next()?;
        return Some(MarkerKind::Bullet(glyph));
    }
    if p.decimal.is_match(text) {
        return Some(MarkerKind::Decimal);
    }
    if let Some(caps) = p.roman.captures(text) {
        let token = caps.get(1)?.as_str();
        let lower = token.to_lowercase();
        let single_letter = token.chars().count() == 1;
        let numeral = !lower.is_empty() && p.strict_roman.is_match(&lower);
        if numeral && (!single_letter || matches!(lower.as_str(), "i" | "v" | "x")) {
            return Some(MarkerKind::Roman);
        }
    }
    if let Some(caps) = p.alpha.captures(text) {
        let letter = caps.get(1).or_else(|| caps.get(2))?.as_str().chars().next()?;
        return Some(if letter.is_uppercase() {
            MarkerKind::UpperAlpha
        } else {
            MarkerKind::LowerAlpha
        });
    }
    None
}

/// Running list state carried through the document in reading order.
#[derive(Debug, Default)]
pub struct ListGrouper {
    next_id: u32,
    current: Option<(ListId, MarkerKind)>,
}

impl ListGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// End the current list (a non-item block or a page without text flow).
    pub fn break_run(&mut self) {
        self.current = None;
    }

    /// List id for an item with the given marker.
    pub fn assign(&mut self, marker: MarkerKind) -> ListId {
        match self.current {
            Some((id, kind)) if kind == marker => id,
            _ => {
                let id = ListId(self.next_id);
                self.next_id += 1;
                self.current = Some((id, marker));
                id
            }
        }
    }

    pub fn lists_opened(&self) -> u32 {
        self.next_id
    }
}

/// Whether the block reads as one list item.
fn item_marker(page: &Page, block: &Block, config: &HeuristicsConfig) -> Option<MarkerKind> {
    let first = page.line(*block.lines.first()?);
    let marker = parse_marker(first.text.trim_start())?;

    // Wrapped lines share one indentation.
    let mut rest = block.lines.iter().skip(1).map(|id| page.line(*id).bbox.x0);
    if let Some(body_x0) = rest.next() {
        if rest.any(|x0| (x0 - body_x0).abs() > config.list_indent_tolerance) {
            return None;
        }
    }
    Some(marker)
}

/// Tag list items on one page, continuing the grouper's current list.
pub fn tag_lists(page: &mut Page, grouper: &mut ListGrouper, config: &HeuristicsConfig) {
    if !page.has_text_flow() {
        grouper.break_run();
        return;
    }

    let order = page.reading_order.clone();
    for id in order {
        let block = page.block(id);
        if block.role.is_some() {
            grouper.break_run();
            continue;
        }
        match item_marker(page, block, config) {
            Some(marker) => {
                let list = grouper.assign(marker);
                page.block_mut(id).role = Some(Role::ListItem { list, marker });
            }
            None => grouper.break_run(),
        }
    }
}
