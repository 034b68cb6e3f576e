//! Positioned text fragments, the smallest unit handed over by ingestion.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::BoundingBox;

/// Page-local handle of a fragment (its position in the page's fragment list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct FragmentId(pub u32);

/// Font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Font style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Superscript or subscript placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    Super,
    Sub,
}

/// A run of text with one font, at one position.
///
/// Fragments are never mutated after ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Assigned on load; ids in the bundle are ignored.
    #[serde(skip)]
    pub id: FragmentId,

    #[serde(skip)]
    pub page: u32,

    pub bbox: BoundingBox,

    pub text: String,

    #[serde(default)]
    pub font_family: String,

    /// Font size in points
    pub size: f32,

    #[serde(default)]
    pub weight: FontWeight,

    #[serde(default)]
    pub style: FontStyle,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<ScriptKind>,

    /// Explicit baseline; defaults to the bottom of the bbox.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f32>,

    /// Column hint from the extraction front-end (unused by the builder).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u16>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub flags: BTreeSet<String>,
}

impl Fragment {
    /// Create a normal-weight fragment.
    pub fn new(text: impl Into<String>, bbox: BoundingBox, font_family: &str, size: f32) -> Self {
        Self {
            id: FragmentId::default(),
            page: 0,
            bbox,
            text: text.into(),
            font_family: font_family.to_string(),
            size,
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
            color: None,
            script: None,
            baseline: None,
            column: None,
            flags: BTreeSet::new(),
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    pub fn italic(mut self) -> Self {
        self.style = FontStyle::Italic;
        self
    }

    pub fn with_script(mut self, script: ScriptKind) -> Self {
        self.script = Some(script);
        self
    }

    pub fn baseline_y(&self) -> f32 {
        self.baseline.unwrap_or(self.bbox.y1)
    }

    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }

    /// Non-whitespace character count, used to weight font statistics.
    pub fn char_count(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }
}
