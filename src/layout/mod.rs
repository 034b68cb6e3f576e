//! Layout builder: fragments to lines to blocks, columns and reading order.
//!
//! The builder runs once per page, after tables have been validated so
//! their confirmed boundaries can act as exclusion zones:
//!
//! 1. fragments inside media, table or ingestion exclusion zones are set aside;
//! 2. the rest are grouped into baseline rows and split into [`Line`]s;
//! 3. compatible consecutive lines become [`Block`](crate::model::Block)s;
//! 4. block x0 values are clustered into columns;
//! 5. blocks are put in reading order.
//!
//! Every sort uses an explicit comparator with an id tie-break, so the same
//! page always yields the same structure.

mod blocks;
mod columns;
mod lines;
mod options;
mod stats;

pub use blocks::form_blocks;
pub use columns::{assign_columns, check_degenerate, reading_order};
pub use lines::form_lines;
pub use options::LayoutConfig;
pub use stats::FontStatistics;

use crate::model::{BoundingBox, FragmentId, Line, Page};

/// Builds lines, blocks, columns and reading order for pages.
#[derive(Debug, Clone, Default)]
pub struct LayoutBuilder {
    config: LayoutConfig,
}

impl LayoutBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with custom configuration.
    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lines over every fragment of the page, ignoring exclusion zones.
    ///
    /// The table validator reads these to find aligned text inside
    /// table candidates before the candidates' zones are settled.
    pub fn probe_lines(&self, page: &Page) -> Vec<Line> {
        let all: Vec<FragmentId> = (0..page.fragments.len() as u32).map(FragmentId).collect();
        form_lines(page, &all, &self.config)
    }

    /// Build the page layout in place.
    pub fn build(&self, page: &mut Page) {
        page.lines.clear();
        page.blocks.clear();
        page.columns.clear();
        page.reading_order.clear();
        page.excluded.clear();
        page.diagnostics.clear();

        if !page.has_text_flow() {
            log::debug!("page {}: no text flow, layout skipped", page.index);
            return;
        }

        page.excluded = self.excluded_fragments(page);
        let flowing = page.flowing_fragments();

        page.lines = form_lines(page, &flowing, &self.config);
        page.blocks = form_blocks(&page.lines, &self.config);
        page.columns = assign_columns(&mut page.blocks, page.width, &self.config);
        page.reading_order = reading_order(&mut page.blocks);

        if let Some(diag) = check_degenerate(&page.lines, &page.columns, page.width, &self.config) {
            log::warn!("page {}: {}", page.index, diag.reason);
            page.diagnostics.push(diag);
        }

        log::debug!(
            "page {}: {} excluded, {} lines, {} blocks, {} columns",
            page.index,
            page.excluded.len(),
            page.lines.len(),
            page.blocks.len(),
            page.columns.len()
        );
    }

    /// Fragments lying inside a media, table or ingestion exclusion zone.
    pub fn excluded_fragments(&self, page: &Page) -> Vec<FragmentId> {
        let zones: Vec<BoundingBox> = page
            .media
            .iter()
            .map(|m| m.bbox)
            .chain(page.tables.iter().map(|t| t.exclusion_zone()))
            .chain(page.exclusions.iter().copied())
            .collect();

        page.fragments
            .iter()
            .filter(|f| {
                zones
                    .iter()
                    .any(|z| z.contains(&f.bbox, self.config.exclusion_tolerance))
            })
            .map(|f| f.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fragment, Media, Table};

    fn frag(text: &str, x0: f32, y0: f32, x1: f32) -> Fragment {
        Fragment::new(text, BoundingBox::new(x0, y0, x1, y0 + 11.0), "Times", 11.0)
    }

    #[test]
    fn test_build_single_paragraph() {
        let mut page = Page::letter(0);
        page.add_fragment(frag("A short", 72.0, 100.0, 120.0));
        page.add_fragment(frag("paragraph.", 123.0, 100.0, 180.0));
        LayoutBuilder::new().build(&mut page);

        assert_eq!(page.lines.len(), 1);
        assert_eq!(page.blocks.len(), 1);
        assert_eq!(page.blocks[0].text, "A short paragraph.");
        assert_eq!(page.reading_order.len(), 1);
    }

    #[test]
    fn test_media_zone_excludes_fragments() {
        let mut page = Page::letter(0);
        page.add_fragment(frag("Body text", 72.0, 100.0, 150.0));
        page.add_fragment(frag("label inside figure", 100.0, 300.0, 200.0));
        page.add_media(Media::new(
            "p1_img1",
            BoundingBox::new(90.0, 280.0, 400.0, 450.0),
            "p1_img1.png",
        ));
        LayoutBuilder::new().build(&mut page);

        assert_eq!(page.excluded, vec![FragmentId(1)]);
        assert_eq!(page.blocks.len(), 1);
        assert_eq!(page.blocks[0].text, "Body text");
    }

    #[test]
    fn test_table_zone_uses_validated_bbox() {
        let mut page = Page::letter(0);
        page.add_fragment(frag("Table 1. Caption", 72.0, 100.0, 180.0));
        page.add_fragment(frag("cell", 72.0, 130.0, 100.0));
        let mut table = Table::new("t", BoundingBox::new(60.0, 95.0, 500.0, 200.0), vec![]);
        table.validated_bbox = Some(BoundingBox::new(60.0, 125.0, 500.0, 200.0));
        page.add_table(table);
        LayoutBuilder::new().build(&mut page);

        assert_eq!(page.excluded, vec![FragmentId(1)]);
        assert_eq!(page.blocks[0].text, "Table 1. Caption");
    }

    #[test]
    fn test_form_page_skips_layout() {
        let mut page = Page::letter(0);
        page.flags.form_page = true;
        page.add_fragment(frag("Name: ____", 72.0, 100.0, 150.0));
        LayoutBuilder::new().build(&mut page);
        assert!(page.blocks.is_empty());
    }

    #[test]
    fn test_probe_lines_include_excluded() {
        let mut page = Page::letter(0);
        page.add_fragment(frag("inside", 100.0, 300.0, 150.0));
        page.add_media(Media::new("m", BoundingBox::new(90.0, 280.0, 400.0, 450.0), "m.png"));
        let builder = LayoutBuilder::new();
        assert_eq!(builder.probe_lines(&page).len(), 1);
    }
}
