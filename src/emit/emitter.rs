//! Walks the page flows and builds the document tree.

use std::collections::BTreeSet;

use crate::flow::{FlowKind, PageFlow};
use crate::model::{
    Block, BlockRef, CaptionTarget, Diagnostic, DiagnosticKind, Document, ListId, MediaIdx, Page, Role, TableIdx,
    TableRow,
};
use crate::text::join_across_break;

use super::result::{ConversionStats, DiagnosticRecord};
use super::sections::SectionStack;
use super::tree::{
    DiagnosticNode, DocumentTree, Equation, Figure, FigureKind, List, Node, Paragraph, TableNode,
};
use super::EmitOptions;

/// Output of one emitter run.
#[derive(Debug, Clone)]
pub struct EmitOutput {
    pub tree: DocumentTree,
    pub stats: ConversionStats,
    pub diagnostics: Vec<DiagnosticRecord>,
}

/// Builds the document tree from the tagged layout and page flows.
#[derive(Debug, Clone, Default)]
pub struct DocumentEmitter {
    options: EmitOptions,
}

impl DocumentEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EmitOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EmitOptions {
        &self.options
    }

    /// Build the tree. Never fails: every ambiguity has a fallback.
    pub fn emit(&self, doc: &Document, flows: &[PageFlow]) -> EmitOutput {
        let mut state = EmitState {
            doc,
            options: &self.options,
            sections: SectionStack::new(),
            pending_list: None,
            consumed: BTreeSet::new(),
            stats: ConversionStats::new(),
            diagnostics: Vec::new(),
        };
        state.stats.page_count = doc.page_count();

        for flow in flows {
            let Some(page) = doc.page(flow.page) else {
                log::warn!("flow for unknown page {}", flow.page);
                continue;
            };
            state.emit_page(page, flow);
        }

        state.flush_list();
        let root = state.sections.finish();
        EmitOutput {
            tree: DocumentTree {
                identifier: doc.metadata.identifier.clone(),
                page_count: doc.page_count(),
                root,
            },
            stats: state.stats,
            diagnostics: state.diagnostics,
        }
    }
}

struct EmitState<'a> {
    doc: &'a Document,
    options: &'a EmitOptions,
    sections: SectionStack,
    pending_list: Option<(ListId, List)>,
    /// Continuation targets already merged into an earlier paragraph
    consumed: BTreeSet<BlockRef>,
    stats: ConversionStats,
    diagnostics: Vec<DiagnosticRecord>,
}

impl EmitState<'_> {
    fn emit_page(&mut self, page: &Page, flow: &PageFlow) {
        for diag in page.diagnostics.iter().chain(&flow.diagnostics) {
            self.diagnostic(page.index, diag);
        }

        for item in &flow.items {
            match &item.kind {
                FlowKind::Block { block } => self.emit_block(page, page.block(*block)),
                FlowKind::Figure { media } => self.emit_figure(page, *media),
                FlowKind::Table { table } => self.emit_table(page, *table),
                FlowKind::Form { render } => {
                    if let Some(file) = render {
                        self.emit_form(page, file);
                    }
                }
            }
        }
    }

    fn normalize(&self, text: &str) -> String {
        self.options.normalizer.apply(text)
    }

    /// Raw text of a block, lines rejoined.
    fn block_text(&self, page: &Page, block: &Block) -> String {
        if !self.options.repair_hyphenation || block.lines.len() < 2 {
            return block.text.clone();
        }
        block
            .lines
            .iter()
            .map(|id| page.line(*id).text.as_str())
            .fold(String::new(), |acc, line| join_across_break(&acc, line))
    }

    fn flush_list(&mut self) {
        if let Some((_, list)) = self.pending_list.take() {
            self.stats.list_count += 1;
            self.sections.push(Node::List(list));
        }
    }

    fn push(&mut self, node: Node) {
        self.flush_list();
        self.sections.push(node);
    }

    fn diagnostic(&mut self, page_index: u32, diag: &Diagnostic) {
        self.stats.diagnostic_count += 1;
        self.diagnostics.push(DiagnosticRecord {
            page: page_index + 1,
            category: diag.kind.as_str().to_string(),
            reason: diag.reason.clone(),
        });
        if self.options.include_diagnostics {
            self.push(Node::Diagnostic(DiagnosticNode {
                category: diag.kind.as_str().to_string(),
                reason: diag.reason.clone(),
            }));
        }
    }

    fn emit_block(&mut self, page: &Page, block: &Block) {
        if self.consumed.contains(&BlockRef::new(page.index, block.id)) {
            return;
        }

        match block.role() {
            Role::Heading { level } => {
                let title = self.normalize(&self.block_text(page, block));
                self.stats.heading_count += 1;
                self.stats.count_text(&title);
                self.flush_list();
                self.sections.open(level, title);
            }
            Role::ListItem { list, marker } => {
                let text = self.normalize(&self.block_text(page, block));
                self.stats.list_item_count += 1;
                self.stats.count_text(&text);
                let continues = matches!(&self.pending_list, Some((id, _)) if *id == list);
                if !continues {
                    self.flush_list();
                    self.pending_list = Some((
                        list,
                        List {
                            ordered: marker.is_ordered(),
                            items: Vec::new(),
                        },
                    ));
                }
                if let Some((_, pending)) = self.pending_list.as_mut() {
                    pending.items.push(text);
                }
            }
            // Linked captions become their target's title.
            Role::Caption { .. } => {}
            Role::Equation => {
                let text = self.normalize(&self.block_text(page, block));
                self.stats.equation_count += 1;
                self.stats.count_text(&text);
                self.push(Node::Equation(Equation { text }));
            }
            Role::Paragraph => {
                let text = self.paragraph_text(page, block);
                self.stats.paragraph_count += 1;
                self.stats.count_text(&text);
                self.push(Node::Paragraph(Paragraph { text }));
            }
        }

        for diag in &block.diagnostics {
            self.diagnostic(page.index, diag);
        }
    }

    /// Block text with every continuation on later pages appended.
    fn paragraph_text(&mut self, page: &Page, block: &Block) -> String {
        let doc = self.doc;
        let mut text = self.block_text(page, block);
        let mut link = block.continuation_target;
        while let Some(target) = link {
            let (Some(next_page), Some(next)) = (doc.page(target.page), doc.block(target)) else {
                break;
            };
            if !self.consumed.insert(target) {
                break;
            }
            text = join_across_break(&text, &self.block_text(next_page, next));
            self.stats.continuation_count += 1;
            link = next.continuation_target;
        }
        self.normalize(&text)
    }

    fn caption_title(&self, page: &Page, target: CaptionTarget) -> Option<String> {
        page.ordered_blocks()
            .find(|b| b.role == Some(Role::Caption { target }))
            .map(|b| self.normalize(&self.block_text(page, b)))
    }

    fn emit_figure(&mut self, page: &Page, idx: MediaIdx) {
        let media = page.media_item(idx);
        let title = self
            .caption_title(page, CaptionTarget::Figure(idx))
            .unwrap_or_else(|| "Figure".to_string());
        self.stats.figure_count += 1;
        self.stats.count_text(&title);
        self.push(Node::Figure(Figure {
            id: media.id.clone(),
            kind: FigureKind::Media,
            title,
            fileref: self.options.fileref(media.file_name()),
        }));
        if media.is_file_missing() {
            let diag = Diagnostic::new(
                DiagnosticKind::MediaFileMissing,
                format!("{}: image file {} not found", media.id, media.file),
            );
            self.diagnostic(page.index, &diag);
        }
    }

    fn emit_table(&mut self, page: &Page, idx: TableIdx) {
        let table = page.table(idx);
        let title = table
            .caption
            .map(|id| self.normalize(&self.block_text(page, page.block(id))))
            .unwrap_or_else(|| "Table".to_string());
        let rows = |src: &[TableRow]| -> Vec<Vec<String>> {
            src.iter()
                .map(|r| r.cells.iter().map(|c| self.normalize(&c.text)).collect())
                .collect()
        };
        let node = TableNode {
            id: table.id.clone(),
            title,
            validation: table.status().as_str().to_string(),
            method: table.status().method().to_string(),
            cols: table.column_count(),
            header: rows(table.header()),
            body: rows(table.body()),
        };

        self.stats.add_table(table.status());
        self.stats.count_text(&node.title);
        for cell in node.header.iter().chain(&node.body).flatten() {
            self.stats.count_text(cell);
        }
        self.push(Node::Table(node));

        for diag in &table.diagnostics {
            self.diagnostic(page.index, diag);
        }
    }

    fn emit_form(&mut self, page: &Page, file: &str) {
        let name = file.rsplit(['/', '\\']).next().unwrap_or(file);
        self.stats.form_count += 1;
        self.push(Node::Figure(Figure {
            id: format!("form-page-{}", page.index + 1),
            kind: FigureKind::Form,
            title: format!("Form, page {}", page.index + 1),
            fileref: self.options.fileref(name),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::build_flow;
    use crate::heuristics::HeuristicsEngine;
    use crate::layout::LayoutBuilder;
    use crate::model::{BoundingBox, Fragment, Media};

    fn frag(text: &str, x0: f32, y0: f32, x1: f32, size: f32) -> Fragment {
        Fragment::new(text, BoundingBox::new(x0, y0, x1, y0 + size), "Times", size)
    }

    fn run(mut doc: Document) -> EmitOutput {
        let builder = LayoutBuilder::new();
        for page in doc.pages.iter_mut() {
            builder.build(page);
        }
        HeuristicsEngine::new().apply(&mut doc);
        let flows = build_flow(&doc);
        DocumentEmitter::new().emit(&doc, &flows)
    }

    #[test]
    fn test_heading_opens_section() {
        let mut page = Page::letter(0);
        page.add_fragment(frag("Introduction", 72.0, 60.0, 240.0, 18.0).bold());
        for i in 0..4 {
            page.add_fragment(frag(
                "body text that fills most of the column width for a realistic paragraph",
                72.0,
                100.0 + i as f32 * 13.0,
                540.0,
                11.0,
            ));
        }
        let mut doc = Document::new("isbn");
        doc.add_page(page);

        let out = run(doc);
        assert_eq!(out.tree.root.len(), 1);
        let Node::Section(section) = &out.tree.root[0] else {
            panic!("expected a section");
        };
        assert_eq!(section.level, 1);
        assert_eq!(section.title, "Introduction");
        assert_eq!(section.children.len(), 1);
        assert_eq!(out.stats.heading_count, 1);
        assert_eq!(out.stats.paragraph_count, 1);
    }

    #[test]
    fn test_soft_hyphen_repaired_inside_block() {
        let mut page = Page::letter(0);
        page.add_fragment(frag("the results of the compu-", 72.0, 100.0, 540.0, 11.0));
        page.add_fragment(frag("tation were stable", 72.0, 113.0, 400.0, 11.0));
        let mut doc = Document::new("isbn");
        doc.add_page(page);

        let out = run(doc);
        assert_eq!(
            out.tree.root,
            vec![Node::Paragraph(Paragraph {
                text: "the results of the computation were stable".to_string()
            })]
        );
    }

    #[test]
    fn test_figure_title_from_caption_and_missing_file() {
        let mut page = Page::letter(0);
        page.add_fragment(frag("Some introductory text.", 72.0, 60.0, 300.0, 11.0));
        let mut media = Media::new("p1_img1", BoundingBox::new(72.0, 100.0, 400.0, 300.0), "out/p1_img1.png");
        media.flags.insert(crate::model::FILE_MISSING.to_string());
        page.add_media(media);
        page.add_fragment(frag("Figure 1: The ward layout", 72.0, 306.0, 260.0, 10.0));
        let mut doc = Document::new("isbn");
        doc.add_page(page);

        let out = run(doc);
        let figure = out
            .tree
            .root
            .iter()
            .find_map(|n| match n {
                Node::Figure(f) => Some(f),
                _ => None,
            })
            .unwrap();
        assert_eq!(figure.title, "Figure 1: The ward layout");
        assert_eq!(figure.fileref, "media/p1_img1.png");
        // caption is not repeated as a paragraph
        assert_eq!(out.stats.paragraph_count, 1);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].category, "media_file_missing");
    }

    #[test]
    fn test_image_only_page_emits_remark() {
        let mut page = Page::letter(0);
        page.flags.image_only = true;
        let mut doc = Document::new("isbn");
        doc.add_page(page);

        let out = run(doc);
        let Node::Diagnostic(d) = &out.tree.root[0] else {
            panic!("expected a remark");
        };
        assert_eq!(d.category, "image_only_page");
        assert_eq!(out.diagnostics[0].page, 1);
    }

    #[test]
    fn test_diagnostics_can_be_left_out_of_tree() {
        let mut page = Page::letter(0);
        page.flags.image_only = true;
        let mut doc = Document::new("isbn");
        doc.add_page(page);
        let flows = build_flow(&doc);

        let out = DocumentEmitter::with_options(EmitOptions::default().with_diagnostics(false)).emit(&doc, &flows);
        assert!(out.tree.root.is_empty());
        assert_eq!(out.diagnostics.len(), 1);
    }
}
