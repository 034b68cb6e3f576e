//! Input PDF sanity checks.
//!
//! The layout itself arrives from the extraction front-end, but the
//! orchestrator still refuses to run when the source PDF is unreadable,
//! not a PDF, or truncated. These are the only checks performed on the
//! PDF bytes.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Header facts gathered from a PDF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
    /// Whether a linearization dictionary appears near the start
    pub linearized: bool,
    /// Byte offset of the `%PDF-` marker (non-zero when junk precedes it)
    pub offset: usize,
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)?;
        if self.linearized {
            write!(f, " (linearized)")?;
        }
        Ok(())
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3;
/// Readers accept the header anywhere in the first kilobyte.
const HEADER_WINDOW: usize = 1024;
const TRAILER_WINDOW: u64 = 1024;
const EOF_MARKER: &[u8] = b"%%EOF";

/// Probe a PDF file: header, version, linearization hint and trailer marker.
///
/// # Example
/// ```no_run
/// use bookxml::detect::probe_pdf;
///
/// let header = probe_pdf("book.pdf").unwrap();
/// println!("{}", header);
/// ```
pub fn probe_pdf<P: AsRef<Path>>(path: P) -> Result<PdfHeader> {
    let mut file = File::open(path.as_ref())?;
    let len = file.metadata()?.len();

    let mut head = Vec::with_capacity(HEADER_WINDOW);
    (&mut file)
        .take(HEADER_WINDOW as u64)
        .read_to_end(&mut head)?;
    let header = parse_header(&head)?;

    let tail_start = len.saturating_sub(TRAILER_WINDOW);
    file.seek(SeekFrom::Start(tail_start))?;
    let mut tail = Vec::new();
    file.read_to_end(&mut tail)?;
    if find(&tail, EOF_MARKER).is_none() {
        return Err(Error::Ingest(format!(
            "{}: missing %%EOF marker (truncated PDF?)",
            path.as_ref().display()
        )));
    }

    Ok(header)
}

/// Parse the header window of a PDF.
///
/// Returns `Error::UnknownFormat` when no `%PDF-` marker is present and
/// `Error::UnsupportedVersion` when the version is not `d.d`.
pub fn parse_header(data: &[u8]) -> Result<PdfHeader> {
    let window = &data[..data.len().min(HEADER_WINDOW)];
    let offset = find(window, PDF_MAGIC).ok_or(Error::UnknownFormat)?;

    let version_start = offset + PDF_MAGIC.len();
    if window.len() < version_start + VERSION_LEN {
        return Err(Error::UnknownFormat);
    }
    let version =
        String::from_utf8_lossy(&window[version_start..version_start + VERSION_LEN]).to_string();
    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfHeader {
        version,
        linearized: find(window, b"/Linearized").is_some(),
        offset,
    })
}

/// Quick check used by the CLI before doing any work.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    probe_pdf(path).is_ok()
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
