//! Text extraction from raw documents, dispatched on the declared file
//! extension. Partial extraction always wins over total failure: a page or
//! paragraph that cannot be decoded contributes an empty string.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod docx;
pub mod format;
pub mod pdf;

use std::fs;
use std::path::Path;

use ragdb_core::error::{Error, Result};

pub use format::DocumentFormat;

/// Extracts normalized text from `path`, choosing the strategy from
/// `declared_extension` (never from file content). Unknown extensions fail
/// with [`Error::UnsupportedFormat`].
pub fn extract(path: &Path, declared_extension: &str) -> Result<String> {
    let format = DocumentFormat::from_extension(declared_extension).ok_or_else(|| {
        Error::UnsupportedFormat {
            extension: declared_extension.trim_start_matches('.').to_string(),
        }
    })?;
    tracing::debug!(path = %path.display(), ?format, "extracting document");
    match format {
        DocumentFormat::Pdf => pdf::extract_pdf(path),
        DocumentFormat::Docx => docx::extract_docx(path),
        DocumentFormat::Text
        | DocumentFormat::Markdown
        | DocumentFormat::Csv
        | DocumentFormat::Json => read_text_lossy(path),
    }
}

/// Verbatim decode; invalid UTF-8 bytes are replaced instead of failing.
fn read_text_lossy(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(_) => Ok(String::from_utf8_lossy(&fs::read(path)?).to_string()),
    }
}
