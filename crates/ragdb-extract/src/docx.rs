//! DOCX extraction: `word/document.xml` inside the zip archive, paragraphs
//! (`<w:p>`) concatenated with newlines.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use ragdb_core::error::{Error, Result};

pub fn extract_docx(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| Error::Extraction(format!("not a docx archive: {}", e)))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| Error::Extraction(format!("missing word/document.xml: {}", e)))?
        .read_to_string(&mut xml)?;
    Ok(paragraphs_from_document_xml(&xml))
}

/// Pull-parses WordprocessingML, collecting the text runs (`<w:t>`) of each
/// paragraph. A paragraph whose text cannot be unescaped contributes an
/// empty string; a truncated document keeps whatever parsed before it.
fn paragraphs_from_document_xml(xml: &str) -> String {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;
    let mut paragraph_failed = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text_run = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => {
                    if paragraph_failed {
                        paragraphs.push(String::new());
                    } else {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    paragraph_failed = false;
                }
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => match t.unescape() {
                Ok(text) => current.push_str(&text),
                Err(_) => paragraph_failed = true,
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "docx body truncated mid-parse, keeping partial text");
                break;
            }
        }
    }
    if !current.is_empty() && !paragraph_failed {
        paragraphs.push(current);
    }

    paragraphs.join("\n").trim().to_string()
}
