//! Fixed-size text chunking
//!
//! Pages are cut into windows of `max_chars` characters, consecutive windows
//! sharing `overlap_chars` characters. Lengths are counted in Unicode scalar
//! values, never bytes, so multi-byte text is never split mid-character.
//! There is no sentence or paragraph awareness.

use crate::config::ChunkConfig;
use crate::loader::{PageDocument, PageMetadata};

/// A window of page text with the provenance of its page
#[derive(Debug, Clone)]
pub struct TextChunk {
    pub text: String,
    pub metadata: PageMetadata,
}

impl TextChunk {
    /// Identifier stored with the chunk: `<source>:<page>`
    pub fn chunk_id(&self) -> String {
        format!("{}:{}", self.metadata.source, self.metadata.page)
    }
}

/// Split every page into overlapping windows, preserving page order
pub fn split_documents(pages: &[PageDocument], config: &ChunkConfig) -> Vec<TextChunk> {
    pages
        .iter()
        .flat_map(|page| {
            split_text(&page.text, config)
                .into_iter()
                .map(|text| TextChunk {
                    text,
                    metadata: page.metadata.clone(),
                })
        })
        .collect()
}

/// Split a single text into overlapping windows
pub fn split_text(text: &str, config: &ChunkConfig) -> Vec<String> {
    // Byte offset of every char, plus the end of the string
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_count = boundaries.len() - 1;

    if char_count == 0 {
        return Vec::new();
    }

    let step = config.step().max(1);
    let mut chunks = Vec::with_capacity(expected_chunk_count(char_count, config));
    let mut start = 0;

    loop {
        let end = (start + config.max_chars).min(char_count);
        chunks.push(text[boundaries[start]..boundaries[end]].to_string());

        if end == char_count {
            break;
        }
        start += step;
    }

    chunks
}

/// Number of windows [`split_text`] produces for a text of `char_count` chars
pub fn expected_chunk_count(char_count: usize, config: &ChunkConfig) -> usize {
    if char_count == 0 {
        0
    } else if char_count <= config.max_chars {
        1
    } else {
        let step = config.step().max(1);
        1 + (char_count - config.max_chars).div_ceil(step)
    }
}
