//! Document-level types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{Block, BlockRef, Page};

/// Global document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Output identifier (ISBN when known)
    pub identifier: String,

    /// Source PDF file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Number of pages in the source
    pub page_count: u32,
}

/// A document's layout: pages in page order plus metadata.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub metadata: Metadata,

    pub pages: Vec<Page>,

    /// Directory extracted media files are resolved against
    pub media_root: Option<PathBuf>,
}

impl Document {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            metadata: Metadata {
                identifier: identifier.into(),
                ..Default::default()
            },
            pages: Vec::new(),
            media_root: None,
        }
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Add a page, keeping the page count in sync.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
        self.metadata.page_count = self.page_count();
    }

    /// Page by its 0-based page index.
    pub fn page(&self, index: u32) -> Option<&Page> {
        match self.pages.get(index as usize) {
            Some(page) if page.index == index => Some(page),
            _ => self.pages.iter().find(|p| p.index == index),
        }
    }

    /// Resolve a document-wide block reference.
    pub fn block(&self, r: BlockRef) -> Option<&Block> {
        self.page(r.page)
            .and_then(|p| p.blocks.get(r.block.0 as usize))
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockId;

    #[test]
    fn test_add_page_tracks_count() {
        let mut doc = Document::new("9780000000001");
        doc.add_page(Page::letter(0));
        doc.add_page(Page::letter(1));
        assert_eq!(doc.metadata.page_count, 2);
        assert_eq!(doc.metadata.identifier, "9780000000001");
        assert!(doc.page(1).is_some());
        assert!(doc.page(2).is_none());
    }

    #[test]
    fn test_missing_block_ref() {
        let doc = Document::new("x");
        assert!(doc.block(BlockRef::new(0, BlockId(0))).is_none());
    }
}
