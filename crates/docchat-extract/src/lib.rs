//! Text extraction for uploaded files.
//!
//! PDFs are converted with the `pdftotext` binary (poppler-utils), which
//! handles real-world PDFs far better than pure-Rust parsers. Plain-text
//! uploads pass straight through. Any failure — missing binary, non-zero
//! exit, empty output — surfaces as an extraction error and the ingestion
//! is aborted with the previous corpus untouched.

use std::path::PathBuf;
use std::process::Command;

use docchat_core::error::{DocChatError, Result};
use docchat_core::traits::TextExtractor;

pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_pdf(&self, bytes: &[u8]) -> Result<String> {
        let temp_file = temp_pdf_path();
        std::fs::write(&temp_file, bytes)
            .map_err(|e| DocChatError::Extraction(format!("Failed to write temp PDF: {e}")))?;

        let output = Command::new("pdftotext")
            .arg("-layout")
            .arg("-enc")
            .arg("UTF-8")
            .arg(&temp_file)
            .arg("-")
            .output();
        let _ = std::fs::remove_file(&temp_file);

        let output = output.map_err(|e| {
            DocChatError::Extraction(format!(
                "Failed to run pdftotext (is poppler-utils installed?): {e}"
            ))
        })?;
        if !output.status.success() {
            return Err(DocChatError::Extraction(format!(
                "pdftotext exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        if text.trim().is_empty() {
            return Err(DocChatError::Extraction(
                "pdftotext produced no text output".into(),
            ));
        }
        tracing::debug!(chars = text.chars().count(), "Extracted PDF text");
        Ok(text)
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdftotextExtractor {
    fn text_of(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        if is_pdf(filename, bytes) {
            self.extract_pdf(bytes)
        } else {
            String::from_utf8(bytes.to_vec())
                .map_err(|e| DocChatError::Extraction(format!("File is not valid UTF-8: {e}")))
        }
    }
}

fn is_pdf(filename: &str, bytes: &[u8]) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf") || bytes.starts_with(b"%PDF-")
}

fn temp_pdf_path() -> PathBuf {
    std::env::temp_dir().join(format!(
        "docchat_upload_{}_{}.pdf",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let extractor = PdftotextExtractor::new();
        let text = extractor
            .text_of("notes.txt", "hello extracted world".as_bytes())
            .unwrap();
        assert_eq!(text, "hello extracted world");
    }

    #[test]
    fn invalid_utf8_text_is_an_extraction_error() {
        let extractor = PdftotextExtractor::new();
        let err = extractor.text_of("notes.txt", &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, DocChatError::Extraction(_)));
    }

    #[test]
    fn pdf_detection_by_extension_and_magic() {
        assert!(is_pdf("report.PDF", b"whatever"));
        assert!(is_pdf("upload.bin", b"%PDF-1.7 ..."));
        assert!(!is_pdf("notes.txt", b"plain text"));
    }

    #[test]
    fn garbage_pdf_is_an_extraction_error() {
        let extractor = PdftotextExtractor::new();
        // Either pdftotext is missing or it rejects the bytes; both are
        // extraction failures.
        let err = extractor.text_of("bad.pdf", b"%PDF-not really").unwrap_err();
        assert!(matches!(err, DocChatError::Extraction(_)));
    }
}
