//! Layout model shared by every pipeline stage.
//!
//! Fragments, media, tables and drawings come from the extraction
//! front-end; lines, blocks, columns and reading order are filled in by
//! the [`layout`](crate::layout) builder; roles, caption links and
//! continuation links by the [`heuristics`](crate::heuristics) engine.

mod block;
mod document;
mod fragment;
mod geometry;
mod media;
mod page;
mod role;
mod table;

pub use block::{Alignment, Block, BlockId, Column, ColumnId, Line, LineId};
pub use document::{Document, Metadata};
pub use fragment::{FontStyle, FontWeight, Fragment, FragmentId, ScriptKind};
pub use geometry::BoundingBox;
pub use media::{Drawing, Media, MediaIdx, MediaKind, Segment, FILE_MISSING, FORM_PAGE_RENDER};
pub use page::{Page, PageFlags};
pub use role::{
    BlockRef, CaptionTarget, Diagnostic, DiagnosticKind, ListId, MarkerKind, Role,
};
pub use table::{Table, TableCell, TableIdx, TableRow, ValidationStatus};
