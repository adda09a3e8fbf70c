use crate::error::{Error, Result};
use crate::models::candidate::ResumeFields;
use regex::Regex;
use std::io::{Cursor, Read};
use std::sync::OnceLock;

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const NAME_SCAN_LINES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    pub fn detect(file_name: &str, mime: &str) -> Self {
        let name = file_name.to_lowercase();
        if mime == PDF_MIME || name.ends_with(".pdf") {
            DocumentKind::Pdf
        } else if mime == DOCX_MIME || name.ends_with(".docx") {
            DocumentKind::Docx
        } else {
            DocumentKind::PlainText
        }
    }
}

pub async fn extract_text(data: bytes::Bytes, file_name: &str, mime: &str) -> Result<String> {
    match DocumentKind::detect(file_name, mime) {
        DocumentKind::Pdf => {
            if !data.starts_with(b"%PDF") {
                return Err(Error::BadRequest("Invalid PDF file content".into()));
            }
            tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem(&data)
                    .map_err(|e| Error::Extraction(format!("PDF extraction error: {}", e)))
            })
            .await
            .map_err(|e| Error::Internal(format!("PDF extraction task failed: {}", e)))?
        }
        DocumentKind::Docx => tokio::task::spawn_blocking(move || docx_to_text(&data))
            .await
            .map_err(|e| Error::Internal(format!("DOCX extraction task failed: {}", e)))?,
        DocumentKind::PlainText => Ok(String::from_utf8_lossy(&data).into_owned()),
    }
}

/// Reads `word/document.xml` out of the archive and flattens it to text,
/// one line per paragraph.
pub fn docx_to_text(data: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| Error::Extraction(format!("Not a DOCX archive: {}", e)))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| Error::Extraction(format!("DOCX has no document body: {}", e)))?
        .read_to_string(&mut xml)
        .map_err(|e| Error::Extraction(format!("Failed to read DOCX body: {}", e)))?;
    Ok(document_xml_to_text(&xml))
}

fn document_xml_to_text(xml: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let tag = TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

    let marked = xml
        .replace("</w:p>", "\n")
        .replace("<w:tab/>", "\t")
        .replace("<w:br/>", "\n");
    let stripped = tag.replace_all(&marked, "");
    decode_entities(&stripped)
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid email regex")
    })
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\+?\d[\d\s\-().]{6,}\d").expect("valid phone regex"))
}

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Z][a-z]+\s+[A-Z][a-z]+(\s+[A-Z][a-z]+)?$").expect("valid name regex")
    })
}

pub fn extract_email(text: &str) -> Option<String> {
    email_re().find(text).map(|m| m.as_str().to_string())
}

pub fn extract_phone(text: &str) -> Option<String> {
    phone_re().find(text).map(|m| m.as_str().trim().to_string())
}

/// First of the leading non-empty lines that is just two or three capitalized words.
pub fn extract_name(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(NAME_SCAN_LINES)
        .find(|l| name_re().is_match(l))
        .map(|l| l.to_string())
}

pub fn extract_fields(text: &str) -> ResumeFields {
    ResumeFields {
        name: extract_name(text),
        email: extract_email(text),
        phone: extract_phone(text),
    }
}
