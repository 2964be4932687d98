use crate::types::{AppError, Chunk, PageDocument, Result};
use text_splitter::{ChunkConfig, TextSplitter};

/// Character-capacity splitter with overlap, backed by `text-splitter`.
///
/// Splits on the largest semantic boundary (paragraph, sentence, word) that
/// keeps each chunk within `chunk_size` characters.
pub struct TextChunker {
    splitter: TextSplitter<text_splitter::Characters>,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(AppError::Configuration(
                "chunk_size must be greater than zero".into(),
            ));
        }

        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .map_err(|e| AppError::Configuration(format!("Invalid chunk settings: {}", e)))?;

        Ok(Self {
            splitter: TextSplitter::new(config),
        })
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        self.splitter
            .chunks(text)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Split every page, keeping page metadata on each chunk.
    pub fn split_documents(&self, pages: &[PageDocument]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for page in pages {
            for content in self.chunk(&page.content) {
                chunks.push(Chunk {
                    content,
                    metadata: page.metadata.clone(),
                    index: chunks.len(),
                });
            }
        }
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PageMetadata;
    use rstest::rstest;

    fn page(n: usize, content: &str) -> PageDocument {
        PageDocument {
            content: content.to_string(),
            metadata: PageMetadata {
                source: "pdf/test.pdf".to_string(),
                page: n,
            },
        }
    }

    #[rstest]
    #[case(0, 0)]
    #[case(100, 100)]
    #[case(100, 150)]
    fn test_invalid_settings_rejected(#[case] size: usize, #[case] overlap: usize) {
        assert!(matches!(
            TextChunker::new(size, overlap),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunker = TextChunker::new(1024, 80).unwrap();
        let chunks = chunker.chunk("A short paragraph.");
        assert_eq!(chunks, vec!["A short paragraph.".to_string()]);
    }

    #[test]
    fn test_chunks_respect_capacity() {
        let chunker = TextChunker::new(50, 10).unwrap();
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(20);
        let chunks = chunker.chunk(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50, "chunk too long: {}", chunk);
        }
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let chunker = TextChunker::new(100, 10).unwrap();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n\n  ").is_empty());
    }

    #[test]
    fn test_split_documents_keeps_page_metadata() {
        let chunker = TextChunker::new(40, 5).unwrap();
        let pages = vec![
            page(0, "First page has some words in it. And more words after that."),
            page(1, ""),
            page(2, "Third page."),
        ];

        let chunks = chunker.split_documents(&pages);

        assert!(chunks.len() >= 3);
        assert_eq!(chunks.first().unwrap().metadata.page, 0);
        assert_eq!(chunks.last().unwrap().metadata.page, 2);
        assert_eq!(chunks.last().unwrap().content, "Third page.");
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
    }
}
