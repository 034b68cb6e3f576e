//! Page-level types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    Block, BlockId, BoundingBox, Column, Diagnostic, Drawing, Fragment, FragmentId, Line, LineId,
    Media, MediaIdx, Table, TableIdx,
};

/// Page-level flags set by ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageFlags {
    /// Interactive or ruled form; replaced by a whole-page render.
    #[serde(default)]
    pub form_page: bool,
    /// No extractable text; skipped with a diagnostic.
    #[serde(default)]
    pub image_only: bool,
}

/// A single page: the arena for everything found on it.
///
/// Entities reference each other through the small index handles
/// (`FragmentId`, `LineId`, `BlockId`, `MediaIdx`, `TableIdx`), which are
/// positions in the vectors below.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Page index (0-based)
    pub index: u32,
    pub width: f32,
    pub height: f32,
    pub flags: PageFlags,
    /// Whole-page render used for form pages.
    pub render: Option<String>,

    pub fragments: Vec<Fragment>,
    pub media: Vec<Media>,
    pub tables: Vec<Table>,
    pub drawings: Vec<Drawing>,
    /// Rectangles ingestion already stripped text from.
    pub exclusions: Vec<BoundingBox>,

    /// Fragments kept out of the text flow by an exclusion zone.
    pub excluded: Vec<FragmentId>,
    pub lines: Vec<Line>,
    pub blocks: Vec<Block>,
    pub columns: Vec<Column>,
    /// Block ids in reading order.
    pub reading_order: Vec<BlockId>,
    pub diagnostics: Vec<Diagnostic>,

    media_ids: BTreeMap<String, MediaIdx>,
    table_ids: BTreeMap<String, TableIdx>,
}

impl Page {
    pub fn new(index: u32, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            ..Default::default()
        }
    }

    /// US Letter page, handy in tests.
    pub fn letter(index: u32) -> Self {
        Self::new(index, 612.0, 792.0)
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(0.0, 0.0, self.width, self.height)
    }

    /// Append a fragment, assigning its handle.
    pub fn add_fragment(&mut self, mut fragment: Fragment) -> FragmentId {
        let id = FragmentId(self.fragments.len() as u32);
        fragment.id = id;
        fragment.page = self.index;
        self.fragments.push(fragment);
        id
    }

    pub fn add_media(&mut self, mut media: Media) -> MediaIdx {
        let idx = MediaIdx(self.media.len() as u32);
        media.page = self.index;
        self.media_ids.entry(media.id.clone()).or_insert(idx);
        self.media.push(media);
        idx
    }

    pub fn add_table(&mut self, mut table: Table) -> TableIdx {
        let idx = TableIdx(self.tables.len() as u32);
        table.page = self.index;
        self.table_ids.entry(table.id.clone()).or_insert(idx);
        self.tables.push(table);
        idx
    }

    pub fn fragment(&self, id: FragmentId) -> &Fragment {
        &self.fragments[id.0 as usize]
    }

    pub fn line(&self, id: LineId) -> &Line {
        &self.lines[id.0 as usize]
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0 as usize]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0 as usize]
    }

    pub fn media_item(&self, idx: MediaIdx) -> &Media {
        &self.media[idx.0 as usize]
    }

    pub fn table(&self, idx: TableIdx) -> &Table {
        &self.tables[idx.0 as usize]
    }

    pub fn media_by_id(&self, id: &str) -> Option<MediaIdx> {
        self.media_ids.get(id).copied()
    }

    pub fn table_by_id(&self, id: &str) -> Option<TableIdx> {
        self.table_ids.get(id).copied()
    }

    /// Blocks in reading order.
    pub fn ordered_blocks(&self) -> impl Iterator<Item = &Block> {
        self.reading_order.iter().map(move |id| self.block(*id))
    }

    pub fn first_block(&self) -> Option<&Block> {
        self.reading_order.first().map(|id| self.block(*id))
    }

    pub fn last_block(&self) -> Option<&Block> {
        self.reading_order.last().map(|id| self.block(*id))
    }

    /// Fragment ids that take part in the text flow.
    pub fn flowing_fragments(&self) -> Vec<FragmentId> {
        (0..self.fragments.len() as u32)
            .map(FragmentId)
            .filter(|id| self.excluded.binary_search(id).is_err())
            .collect()
    }

    /// Whether normal text flow applies to this page.
    pub fn has_text_flow(&self) -> bool {
        !self.flags.form_page && !self.flags.image_only
    }
}
