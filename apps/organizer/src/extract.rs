//! Plaintext extraction from uploaded documents.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;

use crate::prompts::PromptError;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported media type: {0}")]
    Unsupported(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error(transparent)]
    Encoding(#[from] PromptError),
}

/// Kind of document as far as extraction is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Pdf,
    Docx,
}

/// Resolves the extraction strategy for a declared MIME type.
///
/// An empty or `application/octet-stream` type is sniffed from the bytes with
/// `infer`; unrecognised bytes that decode as UTF-8 are treated as text.
pub fn detect_kind(bytes: &[u8], mime_type: &str) -> Result<DocumentKind, ExtractError> {
    let essence = mime_essence(mime_type);

    match essence.as_str() {
        "" | "application/octet-stream" => sniff_kind(bytes),
        declared => kind_for_mime(declared, bytes)
            .ok_or_else(|| ExtractError::Unsupported(mime_type.to_string())),
    }
}

fn sniff_kind(bytes: &[u8]) -> Result<DocumentKind, ExtractError> {
    match infer::get(bytes) {
        Some(detected) => {
            debug!(mime = detected.mime_type(), "sniffed document type");
            kind_for_mime(detected.mime_type(), bytes)
                .ok_or_else(|| ExtractError::Unsupported(detected.mime_type().to_string()))
        }
        None if std::str::from_utf8(bytes).is_ok() => Ok(DocumentKind::Text),
        None => Err(ExtractError::Unsupported(
            "application/octet-stream".to_string(),
        )),
    }
}

fn kind_for_mime(mime: &str, bytes: &[u8]) -> Option<DocumentKind> {
    match mime {
        "text/plain" | "text/csv" => Some(DocumentKind::Text),
        "application/pdf" => Some(DocumentKind::Pdf),
        DOCX_MIME => Some(DocumentKind::Docx),
        // infer reports some Word files as plain zip archives
        "application/zip" if has_docx_body(bytes) => Some(DocumentKind::Docx),
        _ => None,
    }
}

fn mime_essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn has_docx_body(bytes: &[u8]) -> bool {
    ZipArchive::new(Cursor::new(bytes))
        .map(|mut archive| {
            let found = archive.by_name(DOCX_BODY).is_ok();
            found
        })
        .unwrap_or(false)
}

/// Extracts the plaintext body of a document.
///
/// Text must be valid UTF-8; invalid bytes are an encoding error, not replaced.
pub fn extract_text(bytes: &[u8], mime_type: &str) -> Result<String, ExtractError> {
    let kind = detect_kind(bytes, mime_type)?;
    debug!(?kind, mime_type, len = bytes.len(), "extracting text");

    match kind {
        DocumentKind::Text => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| {
                ExtractError::Encoding(PromptError::Encoding {
                    valid_up_to: e.valid_up_to(),
                })
            }),
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map(|text| text.trim().to_string())
            .map_err(|e| ExtractError::Pdf(e.to_string())),
        DocumentKind::Docx => extract_docx(bytes),
    }
}

/// Joins the `w:t` runs of each `w:p` paragraph in `word/document.xml`, one line per paragraph.
fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let docx_err = |e: &dyn std::fmt::Display| ExtractError::Docx(e.to_string());

    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| docx_err(&e))?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| docx_err(&e))?
        .read_to_string(&mut xml)
        .map_err(|e| docx_err(&e))?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(|e| docx_err(&e))? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Empty(e) if e.name().as_ref() == b"w:p" => paragraphs.push(String::new()),
            Event::Text(t) if in_text => {
                current.push_str(&t.unescape().map_err(|e| docx_err(&e))?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs.join("\n").trim().to_string())
}
