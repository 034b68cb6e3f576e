//! Rule-based structural role tagging.
//!
//! The engine annotates laid-out blocks in place. Passes run in a fixed
//! order and a block tagged by an earlier pass is left alone by later ones:
//! headings, list items, captions, equations. Cross-page continuation
//! runs last over the whole document.

pub mod captions;
pub mod continuation;
pub mod equations;
pub mod headings;
pub mod lists;

pub use captions::{link_captions, parse_caption, CaptionKind, CaptionLabel};
pub use continuation::{continues, link_continuations};
pub use equations::{math_density, tag_equations};
pub use headings::{apply_headings, find_candidates, rank_levels, HeadingCandidate, HeadingSignals, StyleKey};
pub use lists::{parse_marker, tag_lists, ListGrouper};

use serde::{Deserialize, Serialize};

use crate::layout::FontStatistics;
use crate::model::{Document, Page};

/// Over which pages heading styles are ranked into levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingScope {
    /// Rank and measure body size per page
    #[default]
    Page,
    /// Rank and measure body size over the whole document
    Document,
}

/// Thresholds for role tagging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    pub heading_scope: HeadingScope,
    /// Points above the body size that make the size signal
    pub size_margin: f32,
    /// A single line narrower than this share of its column is short
    pub short_line_ratio: f32,
    /// Gap above, relative to the median inter-block gap
    pub spacing_ratio: f32,
    pub max_heading_lines: usize,
    pub max_heading_chars: usize,
    pub max_heading_level: u8,

    /// Allowed x0 drift between wrapped lines of a list item
    pub list_indent_tolerance: f32,

    pub figure_caption_distance: f32,
    pub table_caption_distance: f32,

    pub max_equation_lines: usize,
    pub min_math_density: f32,

    pub continuation_size_tolerance: f32,
    pub continuation_indent_tolerance: f32,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            heading_scope: HeadingScope::Page,
            size_margin: 1.5,
            short_line_ratio: 0.6,
            spacing_ratio: 1.5,
            max_heading_lines: 3,
            max_heading_chars: 200,
            max_heading_level: 6,
            list_indent_tolerance: 4.0,
            figure_caption_distance: 50.0,
            table_caption_distance: 60.0,
            max_equation_lines: 4,
            min_math_density: 0.08,
            continuation_size_tolerance: 0.1,
            continuation_indent_tolerance: 4.0,
        }
    }
}

impl HeuristicsConfig {
    pub fn with_heading_scope(mut self, scope: HeadingScope) -> Self {
        self.heading_scope = scope;
        self
    }

    pub fn with_size_margin(mut self, margin: f32) -> Self {
        self.size_margin = margin;
        self
    }

    pub fn with_caption_distances(mut self, figure: f32, table: f32) -> Self {
        self.figure_caption_distance = figure;
        self.table_caption_distance = table;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_heading_level == 0 {
            return Err("heuristics.max_heading_level must be at least 1".to_string());
        }
        if self.figure_caption_distance < 0.0 || self.table_caption_distance < 0.0 {
            return Err("heuristics caption distances must not be negative".to_string());
        }
        Ok(())
    }
}

/// Counts of tags applied by one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagSummary {
    pub headings: usize,
    pub list_items: usize,
    pub lists: u32,
    pub captions: usize,
    pub equations: usize,
    pub continuations: usize,
}

/// Applies the tagging passes to a laid-out document.
#[derive(Debug, Clone, Default)]
pub struct HeuristicsEngine {
    config: HeuristicsConfig,
}

impl HeuristicsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HeuristicsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HeuristicsConfig {
        &self.config
    }

    /// Tag every page of the document in place.
    pub fn apply(&self, doc: &mut Document) -> TagSummary {
        let mut summary = TagSummary {
            headings: self.tag_headings(&mut doc.pages),
            ..Default::default()
        };

        let mut grouper = ListGrouper::new();
        for page in doc.pages.iter_mut() {
            let before = count_list_items(page);
            tag_lists(page, &mut grouper, &self.config);
            summary.list_items += count_list_items(page) - before;
        }
        summary.lists = grouper.lists_opened();

        for page in doc.pages.iter_mut().filter(|p| p.has_text_flow()) {
            summary.captions += link_captions(page, &self.config);
            summary.equations += tag_equations(page, &self.config);
        }

        summary.continuations = link_continuations(&mut doc.pages, &self.config);

        log::debug!(
            "tagged {} headings, {} list items in {} lists, {} captions, {} equations, {} continuations",
            summary.headings,
            summary.list_items,
            summary.lists,
            summary.captions,
            summary.equations,
            summary.continuations
        );
        summary
    }

    fn tag_headings(&self, pages: &mut [Page]) -> usize {
        let max_level = self.config.max_heading_level;
        match self.config.heading_scope {
            HeadingScope::Page => {
                let mut tagged = 0;
                for page in pages.iter_mut().filter(|p| p.has_text_flow()) {
                    let body = FontStatistics::from_page(page).median();
                    let candidates = find_candidates(page, body, &self.config);
                    let levels = rank_levels(candidates.iter().map(|c| c.key), max_level);
                    apply_headings(page, &candidates, &levels);
                    tagged += candidates.len();
                }
                tagged
            }
            HeadingScope::Document => {
                let mut stats = FontStatistics::new();
                for page in pages.iter().filter(|p| p.has_text_flow()) {
                    stats.merge(&FontStatistics::from_page(page));
                }
                let body = stats.median();
                let per_page: Vec<Vec<HeadingCandidate>> = pages
                    .iter()
                    .map(|p| {
                        if p.has_text_flow() {
                            find_candidates(p, body, &self.config)
                        } else {
                            Vec::new()
                        }
                    })
                    .collect();
                let levels = rank_levels(per_page.iter().flatten().map(|c| c.key), max_level);
                for (page, candidates) in pages.iter_mut().zip(&per_page) {
                    apply_headings(page, candidates, &levels);
                }
                per_page.iter().map(Vec::len).sum()
            }
        }
    }
}

fn count_list_items(page: &Page) -> usize {
    page.blocks
        .iter()
        .filter(|b| b.role.map_or(false, |r| r.is_list_item()))
        .count()
}
