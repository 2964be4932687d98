//! PDF loading
//!
//! Extracts per-page text from PDF bytes using pdf-extract. Extraction is CPU
//! bound and can panic on malformed input, so it runs on a blocking thread.

use crate::types::{AppError, PageDocument, PageMetadata, Result};

/// Leading bytes of every PDF file.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// Loader producing one [`PageDocument`] per PDF page.
pub struct PdfLoader;

impl PdfLoader {
    /// Whether `bytes` (named `file_name`) looks like a PDF.
    pub fn is_pdf(file_name: &str, bytes: &[u8]) -> bool {
        bytes.starts_with(PDF_MAGIC) || file_name.to_ascii_lowercase().ends_with(".pdf")
    }

    /// Extract pages from in-memory PDF bytes.
    ///
    /// `source` is recorded on every page, normally the path the file was
    /// saved to.
    pub async fn load_bytes(bytes: Vec<u8>, source: &str) -> Result<Vec<PageDocument>> {
        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        })
        .await
        .map_err(|e| AppError::InvalidInput(format!("PDF extraction aborted: {}", e)))?
        .map_err(|e| AppError::InvalidInput(format!("Failed to extract text from PDF: {}", e)))?;

        Self::from_page_texts(pages, source)
    }

    /// Build page documents from raw page texts.
    pub fn from_page_texts(pages: Vec<String>, source: &str) -> Result<Vec<PageDocument>> {
        let documents: Vec<PageDocument> = pages
            .iter()
            .enumerate()
            .map(|(page, text)| PageDocument {
                content: clean_text(text),
                metadata: PageMetadata {
                    source: source.to_string(),
                    page,
                },
            })
            .collect();

        if documents.iter().all(|d| d.content.is_empty()) {
            return Err(AppError::InvalidInput(
                "PDF contains no extractable text (may be image-only)".into(),
            ));
        }

        Ok(documents)
    }
}

/// Trim lines and collapse runs of blank lines into one paragraph break.
pub fn clean_text(text: &str) -> String {
    text.lines()
        .map(|l| l.trim())
        .fold(Vec::new(), |mut acc: Vec<&str>, line| {
            if !line.is_empty() || acc.last().map(|l| !l.is_empty()).unwrap_or(false) {
                acc.push(line);
            }
            acc
        })
        .join("\n")
        .trim()
        .to_string()
}
