//! Layout bundle ingestion.
//!
//! The extraction front-end writes one JSON bundle per document holding
//! fragments, media, table candidates and drawings for every page. This
//! module turns a bundle into a [`Document`], assigning arena handles and
//! rejecting anything the later stages cannot work with.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{BoundingBox, Document, Drawing, Fragment, Media, Page, PageFlags, Table, FILE_MISSING};

/// Source of page layouts for a PDF.
///
/// The core never reads PDF content streams; implementations hand over
/// what an extraction front-end already produced.
pub trait LayoutSource {
    /// Load the layout of the given PDF.
    fn load(&self, pdf: &Path) -> Result<Document>;
}

/// Reads the JSON bundle written next to the PDF.
#[derive(Debug, Clone, Default)]
pub struct JsonBundleSource {
    /// Explicit bundle path; defaults to `<stem>.layout.json` beside the PDF
    path: Option<PathBuf>,
}

impl JsonBundleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a bundle at an explicit location.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: Some(path.into()) }
    }

    /// Where the bundle for `pdf` is looked up.
    pub fn bundle_path(&self, pdf: &Path) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => default_bundle_path(pdf),
        }
    }
}

impl LayoutSource for JsonBundleSource {
    fn load(&self, pdf: &Path) -> Result<Document> {
        let path = self.bundle_path(pdf);
        let file = File::open(&path)
            .map_err(|e| Error::Ingest(format!("{}: cannot open layout bundle: {}", path.display(), e)))?;
        let mut doc = read_bundle(BufReader::new(file))
            .map_err(|e| Error::Ingest(format!("{}: {}", path.display(), e)))?;
        doc.media_root = path.parent().map(Path::to_path_buf);
        Ok(doc)
    }
}

/// `<dir>/<stem>.layout.json` for `<dir>/<stem>.pdf`.
pub fn default_bundle_path(pdf: &Path) -> PathBuf {
    let stem = pdf.file_stem().and_then(|s| s.to_str()).unwrap_or("document");
    pdf.with_file_name(format!("{}.layout.json", stem))
}

#[derive(Debug, Deserialize)]
struct Bundle {
    #[serde(default)]
    identifier: String,
    #[serde(default)]
    pages: Vec<BundlePage>,
}

#[derive(Debug, Deserialize)]
struct BundlePage {
    index: u32,
    width: f32,
    height: f32,
    #[serde(default)]
    flags: PageFlags,
    #[serde(default)]
    render: Option<String>,
    #[serde(default)]
    fragments: Vec<Fragment>,
    #[serde(default)]
    media: Vec<Media>,
    #[serde(default)]
    tables: Vec<Table>,
    #[serde(default)]
    drawings: Vec<Drawing>,
    #[serde(default)]
    exclusions: Vec<BoundingBox>,
}

/// Parse a bundle from a reader.
///
/// Pages are sorted by index; a duplicate index or a non-finite
/// coordinate anywhere is an ingestion error.
pub fn read_bundle<R: Read>(reader: R) -> Result<Document> {
    let bundle: Bundle =
        serde_json::from_reader(reader).map_err(|e| Error::Ingest(format!("malformed layout bundle: {}", e)))?;
    into_document(bundle)
}

/// Parse a bundle held in memory.
pub fn parse_bundle(json: &str) -> Result<Document> {
    read_bundle(json.as_bytes())
}

fn into_document(mut bundle: Bundle) -> Result<Document> {
    bundle.pages.sort_by_key(|p| p.index);
    if let Some(w) = bundle.pages.windows(2).find(|w| w[0].index == w[1].index) {
        return Err(Error::Ingest(format!("page index {} appears twice", w[0].index)));
    }

    let mut doc = Document::new(bundle.identifier);
    for raw in bundle.pages {
        check_page(&raw)?;
        doc.add_page(into_page(raw));
    }
    log::debug!("bundle: {} pages", doc.page_count());
    Ok(doc)
}

fn check_page(raw: &BundlePage) -> Result<()> {
    let fail = |what: String| Err(Error::Ingest(format!("page {}: {}", raw.index, what)));

    if !(raw.width.is_finite() && raw.height.is_finite()) || raw.width <= 0.0 || raw.height <= 0.0 {
        return fail(format!("invalid page size {}x{}", raw.width, raw.height));
    }
    for (i, f) in raw.fragments.iter().enumerate() {
        if !f.bbox.is_finite() || !f.size.is_finite() || f.baseline.map_or(false, |b| !b.is_finite()) {
            return fail(format!("fragment {} has a non-finite coordinate", i));
        }
    }
    if let Some(m) = raw.media.iter().find(|m| !m.bbox.is_finite()) {
        return fail(format!("media {} has a non-finite bbox", m.id));
    }
    for t in &raw.tables {
        let cells_ok = t.rows.iter().flat_map(|r| &r.cells).all(|c| c.bbox.is_finite());
        if !t.bbox.is_finite() || !cells_ok {
            return fail(format!("table {} has a non-finite bbox", t.id));
        }
    }
    let segments_ok = raw
        .drawings
        .iter()
        .flat_map(|d| &d.segments)
        .all(|s| s.x0.is_finite() && s.y0.is_finite() && s.x1.is_finite() && s.y1.is_finite());
    if !segments_ok {
        return fail("drawing segment has a non-finite coordinate".to_string());
    }
    if raw.exclusions.iter().any(|b| !b.is_finite()) {
        return fail("exclusion rectangle has a non-finite coordinate".to_string());
    }
    Ok(())
}

fn into_page(raw: BundlePage) -> Page {
    let mut page = Page::new(raw.index, raw.width, raw.height);
    page.flags = raw.flags;
    page.render = raw.render;
    page.drawings = raw.drawings;
    page.exclusions = raw.exclusions;
    for fragment in raw.fragments {
        page.add_fragment(fragment);
    }
    for media in raw.media {
        page.add_media(media);
    }
    for table in raw.tables {
        page.add_table(table);
    }
    page
}

/// Flag media whose file does not exist under the document's media root.
///
/// Returns the number of flagged entries. Without a media root nothing
/// can be checked and nothing is flagged.
pub fn mark_missing_media(doc: &mut Document) -> usize {
    let Some(root) = doc.media_root.clone() else {
        return 0;
    };
    let mut missing = 0;
    for page in doc.pages.iter_mut() {
        for media in page.media.iter_mut() {
            if !root.join(&media.file).is_file() {
                log::warn!("page {}: media file {} not found", page.index + 1, media.file);
                media.flags.insert(FILE_MISSING.to_string());
                missing += 1;
            }
        }
    }
    missing
}
