//! Figure regions and vector drawing primitives.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::BoundingBox;

/// Page-local handle of a media entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MediaIdx(pub u32);

/// Flag set by ingestion on whole-page renders of form pages.
pub const FORM_PAGE_RENDER: &str = "form-page-render";

/// Flag set when the referenced image file could not be found.
pub const FILE_MISSING: &str = "file-missing";

/// Kind of figure region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    #[default]
    Raster,
    Vector,
    PageRender,
}

/// A raster or vector figure extracted to a file by the front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: String,

    #[serde(skip)]
    pub page: u32,

    pub bbox: BoundingBox,

    #[serde(default)]
    pub kind: MediaKind,

    /// Extracted image file, relative to the layout bundle.
    pub file: String,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub flags: BTreeSet<String>,
}

impl Media {
    pub fn new(id: impl Into<String>, bbox: BoundingBox, file: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            page: 0,
            bbox,
            kind: MediaKind::Raster,
            file: file.into(),
            flags: BTreeSet::new(),
        }
    }

    pub fn is_form_render(&self) -> bool {
        self.kind == MediaKind::PageRender || self.flags.contains(FORM_PAGE_RENDER)
    }

    pub fn is_file_missing(&self) -> bool {
        self.flags.contains(FILE_MISSING)
    }

    /// File name only, as placed under the output media directory.
    pub fn file_name(&self) -> &str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file.as_str())
    }
}

/// A straight segment from a vector drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Segment {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Segment {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn dx(&self) -> f32 {
        (self.x1 - self.x0).abs()
    }

    pub fn dy(&self) -> f32 {
        (self.y1 - self.y0).abs()
    }
}

impl From<[f32; 4]> for Segment {
    fn from(c: [f32; 4]) -> Self {
        Segment::new(c[0], c[1], c[2], c[3])
    }
}

impl From<Segment> for [f32; 4] {
    fn from(s: Segment) -> Self {
        [s.x0, s.y0, s.x1, s.y1]
    }
}

/// One vector drawing: a path made of segments, optionally filled.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Drawing {
    /// Fill color; filled drawings are backgrounds, not borders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,

    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl Drawing {
    /// An unfilled drawing made of the given segments.
    pub fn stroke(segments: Vec<Segment>) -> Self {
        Self {
            fill: None,
            segments,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.fill.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_render_detection() {
        let mut media = Media::new("p3_render", BoundingBox::new(0.0, 0.0, 612.0, 792.0), "p3.png");
        assert!(!media.is_form_render());
        media.flags.insert(FORM_PAGE_RENDER.to_string());
        assert!(media.is_form_render());
    }

    #[test]
    fn test_file_name() {
        let media = Media::new("m", BoundingBox::default(), "out/images/p1_img1.png");
        assert_eq!(media.file_name(), "p1_img1.png");
        let media = Media::new("m", BoundingBox::default(), "plain.png");
        assert_eq!(media.file_name(), "plain.png");
    }

    #[test]
    fn test_drawing_deserialize() {
        let json = r##"{"fill":"#eeeeee","segments":[[0,0,10,0]]}"##;
        let drawing: Drawing = serde_json::from_str(json).unwrap();
        assert!(drawing.is_filled());
        assert_eq!(drawing.segments[0].dx(), 10.0);
        assert_eq!(drawing.segments[0].dy(), 0.0);
    }
}
