//! Lines and blocks built by the layout builder.

use serde::{Deserialize, Serialize};

use super::{BlockRef, BoundingBox, Diagnostic, FontWeight, FragmentId, Role};

/// Page-local handle of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineId(pub u32);

/// Page-local handle of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u32);

/// Column index on a page, 0 = leftmost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColumnId(pub u16);

/// Fragments sharing a baseline, with no wide horizontal gap between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: LineId,
    /// Fragments in left-to-right order
    pub fragments: Vec<FragmentId>,
    pub bbox: BoundingBox,
    pub baseline: f32,
    pub text: String,
    /// Dominant font family (by character count)
    pub font_family: String,
    /// Dominant font size (by character count)
    pub size: f32,
    pub weight: FontWeight,
    /// At least one super/subscript fragment
    pub has_script: bool,
}

impl Line {
    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }
}

/// Horizontal alignment guessed from line edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justified,
}

/// A run of lines read as one unit (paragraph, heading, list item...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub lines: Vec<LineId>,
    pub bbox: BoundingBox,
    /// Offset of the block's left edge from its column's left edge
    pub indent: f32,
    pub alignment: Alignment,
    /// `None` for full-width blocks spanning every column
    pub column: Option<ColumnId>,
    pub reading_order: Option<u32>,
    /// Line texts joined with single spaces
    pub text: String,
    pub font_family: String,
    pub size: f32,
    pub weight: FontWeight,
    /// Every line is bold
    pub all_bold: bool,

    pub role: Option<Role>,
    /// Next block (on the following page) of the same paragraph
    pub continuation_target: Option<BlockRef>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Block {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Role, with untagged blocks read as paragraphs.
    pub fn role(&self) -> Role {
        self.role.unwrap_or(Role::Paragraph)
    }

    pub fn is_full_width(&self) -> bool {
        self.column.is_none()
    }
}

/// A detected text column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub x0: f32,
    pub x1: f32,
}

impl Column {
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn contains_x(&self, x: f32) -> bool {
        x >= self.x0 && x <= self.x1
    }
}
