//! Per-page flow: blocks in reading order with figures and tables
//! anchored at their vertical position.

use std::cmp::Ordering;

use serde::Serialize;

use crate::model::{BlockId, BoundingBox, Diagnostic, DiagnosticKind, Document, MediaIdx, Page, TableIdx};

/// What a flow item stands for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlowKind {
    Block { block: BlockId },
    Figure { media: MediaIdx },
    Table { table: TableIdx },
    /// Whole-page render standing in for a form page
    Form { render: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowItem {
    #[serde(flatten)]
    pub kind: FlowKind,
    pub page: u32,
    pub y0: f32,
}

/// Ordered items of one page plus page-level diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageFlow {
    pub page: u32,
    pub items: Vec<FlowItem>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PageFlow {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Flow for every page, in page order.
pub fn build_flow(doc: &Document) -> Vec<PageFlow> {
    doc.pages.iter().map(build_page_flow).collect()
}

/// Flow for one page.
pub fn build_page_flow(page: &Page) -> PageFlow {
    let mut flow = PageFlow {
        page: page.index,
        ..Default::default()
    };

    if page.flags.form_page {
        let render = page.render.clone().or_else(|| {
            page.media
                .iter()
                .find(|m| m.is_form_render())
                .map(|m| m.file.clone())
        });
        if render.is_none() {
            log::warn!("page {}: form page without a page render", page.index);
            flow.diagnostics.push(Diagnostic::new(
                DiagnosticKind::FormRenderMissing,
                format!("page {}: form page has no whole-page render", page.index + 1),
            ));
        }
        flow.items.push(FlowItem {
            kind: FlowKind::Form { render },
            page: page.index,
            y0: 0.0,
        });
        return flow;
    }

    if page.flags.image_only {
        flow.diagnostics.push(Diagnostic::new(
            DiagnosticKind::ImageOnlyPage,
            format!("page {}: no extractable text, needs manual review", page.index + 1),
        ));
        return flow;
    }

    // Anchored items in (y0, x0, kind, index) order.
    let mut anchored: Vec<(BoundingBox, FlowKind)> = page
        .media
        .iter()
        .enumerate()
        .filter(|(_, m)| !m.is_form_render())
        .map(|(i, m)| (m.bbox, FlowKind::Figure { media: MediaIdx(i as u32) }))
        .chain(
            page.tables
                .iter()
                .enumerate()
                .map(|(i, t)| (t.exclusion_zone(), FlowKind::Table { table: TableIdx(i as u32) })),
        )
        .collect();
    anchored.sort_by(|a, b| {
        a.0.y0
            .partial_cmp(&b.0.y0)
            .unwrap_or(Ordering::Equal)
            .then(a.0.x0.partial_cmp(&b.0.x0).unwrap_or(Ordering::Equal))
            .then(anchor_rank(&a.1).cmp(&anchor_rank(&b.1)))
    });

    let blocks: Vec<_> = page.ordered_blocks().collect();
    let mut before: Vec<Vec<FlowItem>> = vec![Vec::new(); blocks.len() + 1];
    for (bbox, kind) in anchored {
        let slot = blocks
            .iter()
            .position(|b| b.bbox.y0 > bbox.y0 && b.bbox.horizontal_overlap(&bbox) > 0.0)
            .or_else(|| blocks.iter().position(|b| b.bbox.y0 > bbox.y0))
            .unwrap_or(blocks.len());
        before[slot].push(FlowItem {
            kind,
            page: page.index,
            y0: bbox.y0,
        });
    }

    for (i, block) in blocks.iter().enumerate() {
        flow.items.append(&mut before[i]);
        flow.items.push(FlowItem {
            kind: FlowKind::Block { block: block.id },
            page: page.index,
            y0: block.bbox.y0,
        });
    }
    flow.items.append(&mut before[blocks.len()]);
    flow
}

/// Figures before tables at the same position, then by index.
fn anchor_rank(kind: &FlowKind) -> (u8, u32) {
    match kind {
        FlowKind::Figure { media } => (0, media.0),
        FlowKind::Table { table } => (1, table.0),
        FlowKind::Block { block } => (2, block.0),
        FlowKind::Form { .. } => (3, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutBuilder;
    use crate::model::{Fragment, Media, Table, FORM_PAGE_RENDER};

    fn frag(text: &str, x0: f32, y0: f32, x1: f32) -> Fragment {
        Fragment::new(text, BoundingBox::new(x0, y0, x1, y0 + 11.0), "Times", 11.0)
    }

    fn kinds(flow: &PageFlow) -> Vec<String> {
        flow.items
            .iter()
            .map(|i| match &i.kind {
                FlowKind::Block { block } => format!("b{}", block.0),
                FlowKind::Figure { media } => format!("f{}", media.0),
                FlowKind::Table { table } => format!("t{}", table.0),
                FlowKind::Form { .. } => "form".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_figure_between_paragraphs() {
        let mut page = Page::letter(0);
        page.add_fragment(frag("Above the figure.", 72.0, 100.0, 300.0));
        page.add_fragment(frag("Below the figure.", 72.0, 400.0, 300.0));
        page.add_media(Media::new("m", BoundingBox::new(72.0, 150.0, 400.0, 380.0), "m.png"));
        LayoutBuilder::new().build(&mut page);

        let flow = build_page_flow(&page);
        assert_eq!(kinds(&flow), vec!["b0", "f0", "b1"]);
        assert_eq!(flow.items[1].y0, 150.0);
    }

    #[test]
    fn test_items_after_last_block_go_to_end() {
        let mut page = Page::letter(0);
        page.add_fragment(frag("Only text.", 72.0, 100.0, 300.0));
        page.add_table(Table::new("t2", BoundingBox::new(72.0, 600.0, 500.0, 700.0), vec![]));
        page.add_media(Media::new("m", BoundingBox::new(72.0, 500.0, 400.0, 580.0), "m.png"));
        LayoutBuilder::new().build(&mut page);

        assert_eq!(kinds(&build_page_flow(&page)), vec!["b0", "f0", "t0"]);
    }

    #[test]
    fn test_anchor_prefers_overlapping_block() {
        // Two columns: the figure sits in the right column.
        let mut page = Page::letter(0);
        for i in 0..4 {
            let y = 100.0 + i as f32 * 100.0;
            page.add_fragment(frag("left column text", 72.0, y, 290.0));
            page.add_fragment(frag("right column text", 320.0, y, 540.0));
        }
        page.add_media(Media::new("m", BoundingBox::new(320.0, 150.0, 540.0, 180.0), "m.png"));
        LayoutBuilder::new().build(&mut page);
        let flow = build_page_flow(&page);

        let fig = flow.items.iter().position(|i| matches!(i.kind, FlowKind::Figure { .. })).unwrap();
        let FlowKind::Block { block } = flow.items[fig + 1].kind.clone() else {
            panic!("figure must precede a block");
        };
        assert!(page.block(block).bbox.x0 >= 320.0);
    }

    #[test]
    fn test_form_page_single_item() {
        let mut page = Page::letter(2);
        page.flags.form_page = true;
        page.add_fragment(frag("Name:", 72.0, 100.0, 120.0));
        let mut render = Media::new("r", page.bbox(), "page-0003.png");
        render.flags.insert(FORM_PAGE_RENDER.to_string());
        page.add_media(render);

        let flow = build_page_flow(&page);
        assert_eq!(flow.items.len(), 1);
        assert_eq!(
            flow.items[0].kind,
            FlowKind::Form {
                render: Some("page-0003.png".to_string())
            }
        );
        assert!(flow.diagnostics.is_empty());
    }

    #[test]
    fn test_form_page_without_render() {
        let mut page = Page::letter(0);
        page.flags.form_page = true;
        let flow = build_page_flow(&page);
        assert_eq!(flow.diagnostics[0].kind, DiagnosticKind::FormRenderMissing);
    }

    #[test]
    fn test_image_only_page() {
        let mut page = Page::letter(5);
        page.flags.image_only = true;
        let flow = build_page_flow(&page);
        assert!(flow.is_empty());
        assert_eq!(flow.diagnostics[0].kind, DiagnosticKind::ImageOnlyPage);
        assert!(flow.diagnostics[0].reason.contains("page 6"));
    }
}
