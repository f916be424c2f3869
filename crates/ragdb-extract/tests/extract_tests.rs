use std::fs;
use std::io::Write;

use ragdb_core::error::Error;
use ragdb_extract::{extract, DocumentFormat};

#[test]
fn plain_text_is_returned_verbatim() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("notes.txt");
    fs::write(&path, "line one\nline two\n").expect("write");

    let text = extract(&path, "txt").expect("extract");
    assert_eq!(text, "line one\nline two\n");
}

#[test]
fn markdown_csv_and_json_use_verbatim_decode() {
    let tmp = tempfile::tempdir().expect("tempdir");
    for (name, ext, content) in [
        ("doc.md", "md", "# Title\n\nBody text."),
        ("table.csv", "csv", "a,b\n1,2\n"),
        ("blob.json", "json", "{\"key\": \"value\"}"),
    ] {
        let path = tmp.path().join(name);
        fs::write(&path, content).expect("write");
        assert_eq!(extract(&path, ext).expect("extract"), content);
    }
}

#[test]
fn invalid_utf8_is_tolerated_not_fatal() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("mixed.txt");
    let mut f = fs::File::create(&path).expect("create");
    f.write_all(b"good text \xff\xfe more text").expect("write");
    drop(f);

    let text = extract(&path, "txt").expect("extract");
    assert!(text.starts_with("good text"));
    assert!(text.ends_with("more text"));
}

#[test]
fn unsupported_extension_is_rejected_by_name() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("archive.xyz");
    fs::write(&path, "whatever").expect("write");

    let err = extract(&path, "xyz").expect_err("must fail");
    match err {
        Error::UnsupportedFormat { extension } => assert_eq!(extension, "xyz"),
        other => panic!("wrong error variant: {other:?}"),
    }
}

#[test]
fn format_lookup_is_case_insensitive_and_dot_tolerant() {
    assert_eq!(DocumentFormat::from_extension(".PDF"), Some(DocumentFormat::Pdf));
    assert_eq!(DocumentFormat::from_extension("Md"), Some(DocumentFormat::Markdown));
    assert_eq!(DocumentFormat::from_extension("docx"), Some(DocumentFormat::Docx));
    assert_eq!(DocumentFormat::from_extension("exe"), None);
}

#[test]
fn docx_paragraphs_are_joined_with_newlines() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("report.docx");

    let document_xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>
    <w:p><w:r><w:t>Second </w:t></w:r><w:r><w:t>paragraph.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    let file = fs::File::create(&path).expect("create");
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    writer.start_file("word/document.xml", options).expect("start_file");
    writer.write_all(document_xml.as_bytes()).expect("write xml");
    writer.finish().expect("finish zip");

    let text = extract(&path, "docx").expect("extract");
    assert_eq!(text, "First paragraph.\nSecond paragraph.");
}

#[test]
fn docx_without_document_xml_fails_as_extraction_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("broken.docx");

    let file = fs::File::create(&path).expect("create");
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    writer.start_file("word/other.xml", options).expect("start_file");
    writer.write_all(b"<x/>").expect("write");
    writer.finish().expect("finish zip");

    let err = extract(&path, "docx").expect_err("must fail");
    assert!(matches!(err, Error::Extraction(_)), "wrong variant: {err:?}");
}
