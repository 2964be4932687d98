//! Shared fixtures for integration tests.

#![allow(dead_code)]

pub mod mocks;

use mocks::{MockEmbedder, MockLLMClient};
use pdfrag::db::InMemoryVectorStore;
use pdfrag::{AppState, ConfigManager, PdfRagConfig, RagPipeline};
use std::path::Path;
use std::sync::Arc;

/// Default config with uploads redirected into `upload_dir`.
pub fn test_config(upload_dir: &Path) -> PdfRagConfig {
    let mut config = PdfRagConfig::default();
    config.rag.upload_dir = upload_dir.to_path_buf();
    config
}

/// Pipeline over mocks and an in-memory store.
pub fn test_pipeline(config: PdfRagConfig, llm: MockLLMClient) -> RagPipeline {
    RagPipeline::new(
        Arc::new(MockEmbedder::default()),
        Arc::new(InMemoryVectorStore::new()),
        Arc::new(llm),
        Arc::new(ConfigManager::from_config(config)),
    )
}

pub fn test_state(config: PdfRagConfig, llm: MockLLMClient) -> AppState {
    AppState::new(test_pipeline(config, llm))
}

/// Minimal PDF with one Helvetica text line per page.
pub fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    let font = 3;
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", 4 + 2 * i))
        .collect();

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];
    for (i, text) in pages.iter().enumerate() {
        let stream = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 {} 0 R >> >> /Contents {} 0 R >>",
            font,
            5 + 2 * i
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        out.push_str(&format!("{:010} 00000 n \n", offset));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref
    ));

    out.into_bytes()
}
