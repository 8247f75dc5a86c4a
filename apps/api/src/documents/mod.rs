//! Document text extraction for uploaded resumes (PDF, DOCX, DOC).

use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx", "doc"];

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported file format: '{0}'. Supported: PDF, DOCX, DOC")]
    UnsupportedFormat(String),

    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("Could not read Word document: {0}")]
    Docx(String),
}

/// Lower-cased extension of `file_name`, or an empty string.
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|v| v.to_str())
        .map(|v| v.to_ascii_lowercase())
        .unwrap_or_default()
}

pub fn is_supported(file_name: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&file_extension(file_name).as_str())
}

/// Extracts plain text from a document, dispatching on the file extension.
pub fn extract_text(data: &[u8], file_name: &str) -> Result<String, DocumentError> {
    let extension = file_extension(file_name);
    match extension.as_str() {
        "pdf" => {
            pdf_extract::extract_text_from_mem(data).map_err(|e| DocumentError::Pdf(e.to_string()))
        }
        // Legacy .doc uploads are accepted but only readable when they are OOXML.
        "docx" | "doc" => extract_docx_text(data).map_err(|e| DocumentError::Docx(e.to_string())),
        _ => Err(DocumentError::UnsupportedFormat(extension)),
    }
}

/// Reads `word/document.xml` and emits one line per non-empty paragraph.
fn extract_docx_text(data: &[u8]) -> anyhow::Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;

    let mut document_file = archive.by_name("word/document.xml")?;
    let mut xml = String::new();
    document_file.read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut current = String::new();
    let mut lines = Vec::new();
    let mut in_paragraph = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:p" => {
                in_paragraph = true;
                current.clear();
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => {
                if !current.trim().is_empty() {
                    lines.push(current.trim().to_string());
                }
                current.clear();
                in_paragraph = false;
            }
            Ok(Event::Empty(e)) if in_paragraph && e.name().as_ref() == b"w:tab" => {
                current.push('\t');
            }
            Ok(Event::Text(e)) if in_paragraph => {
                current.push_str(&e.xml_content()?);
            }
            Ok(Event::GeneralRef(e)) if in_paragraph => {
                if let Some(ch) = e.resolve_char_ref()? {
                    current.push(ch);
                } else if let Some(text) = resolve_predefined_entity(&e.decode()?) {
                    current.push_str(text);
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(err.into()),
            _ => {}
        }

        buf.clear();
    }

    Ok(lines.join("\n"))
}

/// Packs `document_xml` into a minimal DOCX archive.
#[cfg(test)]
pub(crate) fn build_docx(document_xml: &str) -> Vec<u8> {
    use std::io::Write;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(document_xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
