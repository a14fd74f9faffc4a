//! Raw upload bytes → plain text. Routing by file extension only.

use std::io::{Cursor, Read};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static XML_PARAGRAPH_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"</w:p>|<w:br\s*/>").unwrap());
static XML_TAB: Lazy<Regex> = Lazy::new(|| Regex::new(r"<w:tab\s*/>").unwrap());
static XML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error("Document contains no extractable text")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    pub fn from_filename(filename: &str) -> Result<Self, DocumentError> {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" => Ok(DocumentKind::Docx),
            "txt" | "md" => Ok(DocumentKind::PlainText),
            _ => Err(DocumentError::UnsupportedType(filename.to_string())),
        }
    }
}

/// Extracts plain text from an uploaded document.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, DocumentError> {
    let text = match DocumentKind::from_filename(filename)? {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| DocumentError::Pdf(e.to_string()))?,
        DocumentKind::Docx => extract_docx(bytes)?,
        DocumentKind::PlainText => String::from_utf8_lossy(bytes).into_owned(),
    };

    if text.trim().is_empty() {
        return Err(DocumentError::Empty);
    }
    Ok(text)
}

fn extract_docx(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| DocumentError::Docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| DocumentError::Docx(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| DocumentError::Docx(e.to_string()))?;

    Ok(docx_xml_to_text(&xml))
}

fn docx_xml_to_text(xml: &str) -> String {
    let text = XML_PARAGRAPH_END.replace_all(xml, "\n");
    let text = XML_TAB.replace_all(&text, "\t");
    let text = XML_TAG.replace_all(&text, "");
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(DocumentKind::from_filename("cv.PDF").unwrap(), DocumentKind::Pdf);
        assert_eq!(
            DocumentKind::from_filename("resume.final.docx").unwrap(),
            DocumentKind::Docx
        );
        assert_eq!(
            DocumentKind::from_filename("jd.txt").unwrap(),
            DocumentKind::PlainText
        );
        assert!(matches!(
            DocumentKind::from_filename("resume.doc"),
            Err(DocumentError::UnsupportedType(_))
        ));
        assert!(DocumentKind::from_filename("README").is_err());
    }

    #[test]
    fn test_plain_text_passthrough() {
        let text = extract_text("jd.txt", "Required Skills: Rust".as_bytes()).unwrap();
        assert_eq!(text, "Required Skills: Rust");
    }

    #[test]
    fn test_blank_document_is_empty_error() {
        assert!(matches!(
            extract_text("jd.txt", b"   \n "),
            Err(DocumentError::Empty)
        ));
    }

    #[test]
    fn test_invalid_docx_container_is_error() {
        assert!(matches!(
            extract_text("cv.docx", b"not a zip"),
            Err(DocumentError::Docx(_))
        ));
    }

    #[test]
    fn test_docx_xml_to_text() {
        let xml = r#"<w:document><w:body><w:p><w:r><w:t>Skills: Rust &amp; Go</w:t></w:r></w:p><w:p><w:r><w:t>Experience</w:t></w:r></w:p></w:body></w:document>"#;
        assert_eq!(docx_xml_to_text(xml), "Skills: Rust & Go\nExperience\n");
    }
}
