use serde::{Deserialize, Serialize};

use super::Embedding;

/// A stored text together with its embedding. Never mutated after ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    text: String,
    embedding: Embedding,
}

impl Document {
    pub fn new(text: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            text: text.into(),
            embedding,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn embedding(&self) -> &Embedding {
        &self.embedding
    }
}

/// Splits content into chunks by paragraph boundaries.
///
/// Paragraphs are joined until they exceed `chunk_size`, then a new chunk starts.
pub fn chunk_content(content: &str, chunk_size: usize) -> Vec<String> {
    let paragraphs = content
        .split("\n\n")
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in paragraphs {
        let would_exceed =
            !current.is_empty() && current.len() + paragraph.len() + 2 > chunk_size;

        if would_exceed {
            chunks.push(std::mem::take(&mut current));
        }

        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(paragraph);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_content_single_chunk() {
        let chunks = chunk_content("Hello world.\n\nThis is a test.", 100);
        assert_eq!(chunks, vec!["Hello world.\n\nThis is a test."]);
    }

    #[test]
    fn test_chunk_content_multiple_chunks() {
        let content = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        let chunks = chunk_content(content, 30);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1], "Second paragraph.");
    }

    #[test]
    fn test_chunk_content_skips_blank_paragraphs() {
        let chunks = chunk_content("  \n\n\n\nonly\n\n   ", 100);
        assert_eq!(chunks, vec!["only"]);
    }

    #[test]
    fn test_chunk_content_empty() {
        assert!(chunk_content("", 100).is_empty());
    }
}
