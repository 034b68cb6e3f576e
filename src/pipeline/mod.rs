//! Orchestration: load a layout, run every stage, write the outputs.
//!
//! # Example
//!
//! ```no_run
//! use bookxml::pipeline::{convert_file, ConvertOptions};
//!
//! fn main() -> bookxml::Result<()> {
//!     let options = ConvertOptions::new("out").with_isbn("978-0-00-000000-0");
//!     let summary = convert_file("book.pdf", &options)?;
//!     println!("{} diagnostics", summary.stats.diagnostic_count);
//!     Ok(())
//! }
//! ```

mod enrichment;
mod ingest;

pub use enrichment::{Advisory, Capabilities, EnrichmentGate, EnrichmentPass};
pub use ingest::{
    default_bundle_path, mark_missing_media, parse_bundle, read_bundle, JsonBundleSource, LayoutSource,
};

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::detect;
use crate::emit::{
    to_json, to_xml, ConversionStats, DiagnosticsReport, DocumentEmitter, DocumentTree, EmitOptions, JsonFormat,
};
use crate::error::{Error, Result};
use crate::flow::build_flow;
use crate::heuristics::{HeuristicsConfig, HeuristicsEngine, TagSummary};
use crate::layout::{LayoutBuilder, LayoutConfig};
use crate::model::Document;
use crate::table::{TableValidator, TableValidatorConfig};

/// Configuration of every stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub layout: LayoutConfig,
    pub tables: TableValidatorConfig,
    pub heuristics: HeuristicsConfig,
    pub emit: EmitOptions,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_tables(mut self, tables: TableValidatorConfig) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_heuristics(mut self, heuristics: HeuristicsConfig) -> Self {
        self.heuristics = heuristics;
        self
    }

    pub fn with_emit(mut self, emit: EmitOptions) -> Self {
        self.emit = emit;
        self
    }

    /// Check every section; the first problem found is reported.
    pub fn validate(&self) -> Result<()> {
        self.layout
            .validate()
            .and_then(|_| self.tables.validate())
            .and_then(|_| self.heuristics.validate())
            .and_then(|_| self.emit.validate())
            .map_err(Error::InvalidConfig)
    }

    /// Parse a JSON config; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub xml: String,
    pub tree: DocumentTree,
    pub report: DiagnosticsReport,
    pub tags: TagSummary,
    /// Notes from the enrichment pass, if one ran
    pub advisories: Vec<Advisory>,
}

impl ConversionOutput {
    pub fn stats(&self) -> &ConversionStats {
        &self.report.stats
    }

    pub fn report_json(&self, format: JsonFormat) -> Result<String> {
        to_json(&self.report, format)
    }
}

/// The fixed stage sequence over one document.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
    capabilities: Capabilities,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            capabilities: Capabilities::none(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage. Layout ambiguities end up as diagnostics; the
    /// run itself cannot fail.
    pub fn run(&self, doc: &mut Document) -> ConversionOutput {
        let builder = LayoutBuilder::with_config(self.config.layout.clone());
        let validator = TableValidator::with_config(self.config.tables.clone());

        for page in doc.pages.iter_mut() {
            // Tables first: their confirmed zones are exclusions for block formation.
            let lines = builder.probe_lines(page);
            validator.validate_page(page, &lines);
            builder.build(page);
        }

        let tags = HeuristicsEngine::with_config(self.config.heuristics.clone()).apply(doc);
        let flows = build_flow(doc);
        let emitted = DocumentEmitter::with_options(self.config.emit.clone()).emit(doc, &flows);
        let xml = to_xml(&emitted.tree, self.config.emit.indent);
        let advisories = self.capabilities.run(&emitted.tree);

        log::info!(
            "{}: {} pages, {} headings, {} tables, {} diagnostics",
            doc.metadata.identifier,
            emitted.stats.page_count,
            emitted.stats.heading_count,
            emitted.stats.table_count(),
            emitted.stats.diagnostic_count
        );

        ConversionOutput {
            xml,
            report: DiagnosticsReport::new(doc.metadata.identifier.clone(), emitted.stats, emitted.diagnostics),
            tree: emitted.tree,
            tags,
            advisories,
        }
    }
}

/// Options for converting a PDF on disk.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub output_dir: PathBuf,
    /// Overrides the document identifier
    pub isbn: Option<String>,
    /// Bundle location; defaults to `<stem>.layout.json` beside the PDF
    pub layout_path: Option<PathBuf>,
    pub config: PipelineConfig,
    pub capabilities: Capabilities,
    pub report_format: JsonFormat,
}

impl ConvertOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            isbn: None,
            layout_path: None,
            config: PipelineConfig::default(),
            capabilities: Capabilities::none(),
            report_format: JsonFormat::Pretty,
        }
    }

    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    pub fn with_layout_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.layout_path = Some(path.into());
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_report_format(mut self, format: JsonFormat) -> Self {
        self.report_format = format;
        self
    }
}

/// What [`convert_file`] wrote.
#[derive(Debug, Clone)]
pub struct ConvertSummary {
    pub source: PathBuf,
    pub xml_path: PathBuf,
    pub report_path: PathBuf,
    pub stats: ConversionStats,
    pub media_copied: usize,
    pub advisories: Vec<Advisory>,
}

/// Convert one PDF: check it, load its layout bundle, run the pipeline,
/// copy media and write `<stem>.xml` and `<stem>.diagnostics.json`.
///
/// Nothing is written when the PDF or its bundle cannot be read.
pub fn convert_file<P: AsRef<Path>>(pdf: P, options: &ConvertOptions) -> Result<ConvertSummary> {
    let pdf = pdf.as_ref();
    options.config.validate()?;

    let header = detect::probe_pdf(pdf)?;
    log::debug!("{}: {}", pdf.display(), header);

    let source = match &options.layout_path {
        Some(path) => JsonBundleSource::with_path(path),
        None => JsonBundleSource::new(),
    };
    let mut doc = source.load(pdf)?;

    let stem = pdf
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string();
    if let Some(isbn) = &options.isbn {
        doc.metadata.identifier = isbn.clone();
    } else if doc.metadata.identifier.trim().is_empty() {
        doc.metadata.identifier = stem.clone();
    }
    doc.metadata.source = pdf.file_name().map(|n| n.to_string_lossy().into_owned());
    mark_missing_media(&mut doc);

    let pipeline = Pipeline::new(options.config.clone()).with_capabilities(options.capabilities.clone());
    let output = pipeline.run(&mut doc);
    let report_json = output.report_json(options.report_format)?;

    fs::create_dir_all(&options.output_dir)?;
    let media_copied = copy_media(&doc, &options.output_dir.join(&options.config.emit.media_dir))?;

    let xml_path = options.output_dir.join(format!("{}.xml", stem));
    let report_path = options.output_dir.join(format!("{}.diagnostics.json", stem));
    write_replacing(&xml_path, output.xml.as_bytes())?;
    write_replacing(&report_path, report_json.as_bytes())?;

    Ok(ConvertSummary {
        source: pdf.to_path_buf(),
        xml_path,
        report_path,
        stats: output.report.stats,
        media_copied,
        advisories: output.advisories,
    })
}

/// Convert many PDFs in parallel, one independent pipeline each.
/// Results come back in input order.
pub fn convert_batch(pdfs: &[PathBuf], options: &ConvertOptions) -> Vec<Result<ConvertSummary>> {
    convert_batch_with(pdfs, options, |_, _| {})
}

/// [`convert_batch`] calling `on_done` as each document finishes, in
/// completion order.
pub fn convert_batch_with<F>(pdfs: &[PathBuf], options: &ConvertOptions, on_done: F) -> Vec<Result<ConvertSummary>>
where
    F: Fn(&Path, &Result<ConvertSummary>) + Sync + Send,
{
    pdfs.par_iter()
        .map(|pdf| {
            let result = convert_file(pdf, options);
            on_done(pdf, &result);
            result
        })
        .collect()
}

/// Copy every media file and page render that exists into `dest`.
fn copy_media(doc: &Document, dest: &Path) -> Result<usize> {
    let Some(root) = doc.media_root.as_deref() else {
        return Ok(0);
    };

    let files = doc.pages.iter().flat_map(|page| {
        page.media
            .iter()
            .filter(|m| !m.is_file_missing())
            .map(|m| m.file.as_str())
            .chain(page.render.as_deref())
    });

    let mut copied = 0;
    for file in files {
        let from = root.join(file);
        if !from.is_file() {
            log::warn!("skipping missing media file {}", from.display());
            continue;
        }
        let name = Path::new(file)
            .file_name()
            .ok_or_else(|| Error::Other(format!("media path without a file name: {}", file)))?;
        if copied == 0 {
            fs::create_dir_all(dest)?;
        }
        fs::copy(&from, dest.join(name))?;
        copied += 1;
    }
    Ok(copied)
}

/// Write through a sibling temp file so readers never see a partial file.
fn write_replacing(path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
