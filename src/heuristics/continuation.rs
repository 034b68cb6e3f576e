//! Cross-page paragraph continuation.

use crate::model::{Block, BlockRef, Page, Role};
use crate::text::ends_with_terminator;

use super::HeuristicsConfig;

fn is_plain_paragraph(block: &Block) -> bool {
    block.role() == Role::Paragraph
}

/// Whether `next` (first block of the following page) continues `last`.
pub fn continues(last: &Block, next: &Block, config: &HeuristicsConfig) -> bool {
    is_plain_paragraph(last)
        && is_plain_paragraph(next)
        && !ends_with_terminator(&last.text)
        && last.font_family == next.font_family
        && (last.size - next.size).abs() <= config.continuation_size_tolerance
        && last.weight == next.weight
        && (last.indent - next.indent).abs() <= config.continuation_indent_tolerance
}

/// Link the last block of each page to the first block of the next page
/// when the paragraph runs across the break. Returns the links made.
pub fn link_continuations(pages: &mut [Page], config: &HeuristicsConfig) -> usize {
    let mut linked = 0;
    for i in 1..pages.len() {
        let (before, after) = pages.split_at_mut(i);
        let prev = &mut before[i - 1];
        let next = &after[0];

        if next.index != prev.index + 1 || !prev.has_text_flow() || !next.has_text_flow() {
            continue;
        }
        let (Some(last_id), Some(first)) = (prev.reading_order.last().copied(), next.first_block()) else {
            continue;
        };
        if continues(prev.block(last_id), first, config) {
            prev.block_mut(last_id).continuation_target = Some(BlockRef::new(next.index, first.id));
            log::debug!(
                "page {} block {} continues on page {} block {}",
                prev.index,
                last_id.0,
                next.index,
                first.id.0
            );
            linked += 1;
        }
    }
    linked
}
