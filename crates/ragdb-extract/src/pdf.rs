//! PDF extraction via the `pdftotext` system binary (poppler).
//!
//! Form feeds in the output mark page boundaries; they are normalized to
//! blank-line separators so downstream chunking sees pages as paragraphs.

use std::path::Path;
use std::process::Command;

use ragdb_core::error::{Error, Result};

pub fn extract_pdf(path: &Path) -> Result<String> {
    let output = Command::new("pdftotext")
        .arg("-enc")
        .arg("UTF-8")
        .arg(path)
        .arg("-")
        .output()
        .map_err(|e| {
            Error::Extraction(format!(
                "failed to run pdftotext: {} (is poppler installed?)",
                e
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Extraction(format!(
            "pdftotext exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    let pages: Vec<String> = raw
        .split('\u{0c}')
        .map(|page| page.trim().to_string())
        .collect();
    Ok(pages.join("\n\n").trim().to_string())
}
