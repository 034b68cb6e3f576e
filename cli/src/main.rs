//! bookxml CLI - PDF book layout to DocBook-like XML

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use bookxml::pipeline::default_bundle_path;
use bookxml::{
    convert_batch_with, convert_file, probe_pdf, ConvertOptions, ConvertSummary, JsonBundleSource, JsonFormat,
    LayoutSource, PipelineConfig,
};

#[derive(Parser)]
#[command(name = "bookxml")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert PDF book layouts to DocBook-like XML", long_about = None)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one PDF
    Convert {
        /// Input PDF file
        #[arg(value_name = "PDF")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output_dir: PathBuf,

        /// Document identifier written on the book element
        #[arg(long, env = "BOOKXML_ISBN")]
        isbn: Option<String>,

        /// Layout bundle (default: <stem>.layout.json beside the PDF)
        #[arg(long, value_name = "FILE")]
        layout: Option<PathBuf>,

        #[command(flatten)]
        settings: Settings,
    },

    /// Convert many PDFs in parallel
    Batch {
        /// Input PDF files
        #[arg(value_name = "PDF", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output_dir: PathBuf,

        #[command(flatten)]
        settings: Settings,
    },

    /// Show PDF header and layout bundle information
    Info {
        /// Input PDF file
        #[arg(value_name = "PDF")]
        input: PathBuf,

        /// Layout bundle (default: <stem>.layout.json beside the PDF)
        #[arg(long, value_name = "FILE")]
        layout: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct Settings {
    /// Pipeline configuration (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the diagnostics report as compact JSON
    #[arg(long)]
    compact_report: bool,

    /// Leave diagnostic remarks out of the XML (they stay in the report)
    #[arg(long)]
    no_remarks: bool,
}

impl Settings {
    fn options(&self, output_dir: &Path) -> bookxml::Result<ConvertOptions> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };
        if self.no_remarks {
            config.emit.include_diagnostics = false;
        }
        let format = if self.compact_report {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        };
        Ok(ConvertOptions::new(output_dir)
            .with_config(config)
            .with_report_format(format))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Convert {
            input,
            output_dir,
            isbn,
            layout,
            settings,
        } => cmd_convert(&input, &output_dir, isbn, layout, &settings),
        Commands::Batch {
            inputs,
            output_dir,
            settings,
        } => cmd_batch(&inputs, &output_dir, &settings),
        Commands::Info { input, layout, json } => cmd_info(&input, layout, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let label = if e.is_ingestion() { "Ingestion error" } else { "Error" };
            eprintln!("{}: {}", label.red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_convert(
    input: &Path,
    output_dir: &Path,
    isbn: Option<String>,
    layout: Option<PathBuf>,
    settings: &Settings,
) -> bookxml::Result<()> {
    let mut options = settings.options(output_dir)?;
    if let Some(isbn) = isbn {
        options = options.with_isbn(isbn);
    }
    if let Some(layout) = layout {
        options = options.with_layout_path(layout);
    }

    log::debug!("converting {} into {}", input.display(), output_dir.display());
    let summary = convert_file(input, &options)?;
    print_summary(&summary);
    Ok(())
}

fn cmd_batch(inputs: &[PathBuf], output_dir: &Path, settings: &Settings) -> bookxml::Result<()> {
    let options = settings.options(output_dir)?;

    let pb = ProgressBar::new(inputs.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}") {
        pb.set_style(style.progress_chars("#>-"));
    }

    let results = convert_batch_with(inputs, &options, |pdf, result| {
        if let Err(e) = result {
            pb.println(format!("{} {}: {}", "failed".red(), pdf.display(), e));
        }
        pb.set_message(pdf.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default());
        pb.inc(1);
    });
    pb.finish_and_clear();

    let failed = results.iter().filter(|r| r.is_err()).count();
    let diagnostics: u32 = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|s| s.stats.diagnostic_count)
        .sum();

    println!(
        "{} {} converted, {} failed, {} diagnostics",
        "Done!".green().bold(),
        inputs.len() - failed,
        failed,
        diagnostics
    );

    if failed > 0 {
        return Err(bookxml::Error::Other(format!("{} of {} documents failed", failed, inputs.len())));
    }
    Ok(())
}

fn cmd_info(input: &Path, layout: Option<PathBuf>, json: bool) -> bookxml::Result<()> {
    let header = probe_pdf(input)?;
    let source = match layout {
        Some(path) => JsonBundleSource::with_path(path),
        None => JsonBundleSource::new(),
    };
    let bundle = source.bundle_path(input);
    let doc = source.load(input)?;

    let fragments: usize = doc.pages.iter().map(|p| p.fragments.len()).sum();
    let media: usize = doc.pages.iter().map(|p| p.media.len()).sum();
    let tables: usize = doc.pages.iter().map(|p| p.tables.len()).sum();
    let forms = doc.pages.iter().filter(|p| p.flags.form_page).count();
    let image_only = doc.pages.iter().filter(|p| p.flags.image_only).count();

    if json {
        let info = serde_json::json!({
            "file": input.display().to_string(),
            "version": header.version,
            "linearized": header.linearized,
            "layout": bundle.display().to_string(),
            "identifier": doc.metadata.identifier,
            "pages": doc.page_count(),
            "fragments": fragments,
            "media": media,
            "table_candidates": tables,
            "form_pages": forms,
            "image_only_pages": image_only,
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), header);
    println!("{}: {}", "Layout".bold(), bundle.display());
    if bundle != default_bundle_path(input) {
        println!("{}", "  (explicit bundle path)".dimmed());
    }

    println!();
    println!("{}", "Layout Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    if !doc.metadata.identifier.is_empty() {
        println!("{}: {}", "Identifier".bold(), doc.metadata.identifier);
    }
    println!("{}: {}", "Pages".bold(), doc.page_count());
    println!("{}: {}", "Fragments".bold(), fragments);
    println!("{}: {}", "Media".bold(), media);
    println!("{}: {}", "Table candidates".bold(), tables);
    println!("{}: {}", "Form pages".bold(), forms);
    println!("{}: {}", "Image-only pages".bold(), image_only);

    Ok(())
}

fn print_summary(summary: &ConvertSummary) {
    let stats = &summary.stats;
    println!("{} {}", "Converted".green().bold(), summary.source.display());
    println!("  {} {}", "├─".dimmed(), summary.xml_path.display());
    println!("  {} {}", "├─".dimmed(), summary.report_path.display());
    println!("  {} {} media files", "└─".dimmed(), summary.media_copied);
    println!(
        "{} pages, {} headings, {} paragraphs, {} tables ({} unvalidated), {} figures",
        stats.page_count,
        stats.heading_count,
        stats.paragraph_count,
        stats.table_count(),
        stats.tables_text_only,
        stats.figure_count
    );
    if stats.diagnostic_count > 0 {
        println!("{} {} diagnostics for review", "Note:".yellow(), stats.diagnostic_count);
    }
}
