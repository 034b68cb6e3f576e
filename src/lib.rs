//! # bookxml
//!
//! Deterministic reconstruction of born-digital PDF book layouts into a
//! DocBook-like XML tree.
//!
//! An extraction front-end hands over positioned text fragments, figure
//! regions, table candidates and vector drawings per page. This crate
//! turns them into a hierarchical document:
//!
//! 1. [`table`] confirms table boundaries against drawn ruling lines or
//!    text alignment;
//! 2. [`layout`] forms lines, blocks, columns and reading order;
//! 3. [`heuristics`] tags headings, lists, captions, equations and
//!    paragraphs continued across pages;
//! 4. [`flow`] anchors figures and tables between blocks;
//! 5. [`emit`] builds the section tree and serializes it.
//!
//! The same input always yields byte-identical output. Low-confidence
//! decisions never fail a run; they become `<remark>` diagnostics.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bookxml::{convert_file, ConvertOptions};
//!
//! fn main() -> bookxml::Result<()> {
//!     let options = ConvertOptions::new("out").with_isbn("978-0-00-000000-0");
//!     let summary = convert_file("book.pdf", &options)?;
//!     println!("wrote {}", summary.xml_path.display());
//!     Ok(())
//! }
//! ```
//!
//! Working on an in-memory layout:
//!
//! ```
//! use bookxml::model::{BoundingBox, Document, Fragment, Page};
//! use bookxml::Pipeline;
//!
//! let mut page = Page::letter(0);
//! page.add_fragment(Fragment::new("Hello.", BoundingBox::new(72.0, 100.0, 110.0, 111.0), "Times", 11.0));
//! let mut doc = Document::new("demo");
//! doc.add_page(page);
//!
//! let output = Pipeline::default().run(&mut doc);
//! assert!(output.xml.contains("<para>Hello.</para>"));
//! ```

pub mod detect;
pub mod emit;
pub mod error;
pub mod flow;
pub mod heuristics;
pub mod layout;
pub mod model;
pub mod pipeline;
pub mod table;
pub mod text;

pub use detect::{is_pdf, probe_pdf, PdfHeader};
pub use emit::{
    to_json, to_xml, ConversionStats, DiagnosticRecord, DiagnosticsReport, DocumentEmitter, DocumentTree,
    EmitOptions, JsonFormat, Node,
};
pub use error::{Error, Result};
pub use flow::{build_flow, FlowItem, FlowKind, PageFlow};
pub use heuristics::{HeadingScope, HeuristicsConfig, HeuristicsEngine, TagSummary};
pub use layout::{LayoutBuilder, LayoutConfig};
pub use model::{Document, Page};
pub use pipeline::{
    convert_batch, convert_batch_with, convert_file, Capabilities, ConversionOutput, ConvertOptions,
    ConvertSummary, EnrichmentGate, EnrichmentPass, JsonBundleSource, LayoutSource, Pipeline, PipelineConfig,
};
pub use table::{TableValidator, TableValidatorConfig};
pub use text::TextNormalizer;

/// Convert an in-memory layout with default settings and return the XML.
///
/// # Example
///
/// ```
/// use bookxml::model::Document;
///
/// let xml = bookxml::to_docbook(&mut Document::new("empty"));
/// assert!(xml.contains("<book id=\"empty\" pages=\"0\">"));
/// ```
pub fn to_docbook(doc: &mut Document) -> String {
    Pipeline::default().run(doc).xml
}
