//! Word-window chunking of page text.
//!
//! Splits OCR'd page text into overlapping fixed-size word windows suitable
//! for embedding and semantic search. Chunking is pure and deterministic:
//! the same text and parameters always produce the same chunk sequence.

use super::models::{Chunk, ChunkingParams};

/// Split raw text into overlapping word windows.
///
/// Windows are `chunk_size` words wide and advance by
/// `max(1, chunk_size - overlap)` words. Empty windows are never emitted, so
/// a page with no words yields no chunks and a page shorter than one window
/// yields exactly one chunk with all of its words.
pub fn chunk_text(text: &str, params: &ChunkingParams) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let step = params.step();
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < words.len() {
        let end = (start + params.chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        start += step;
    }
    chunks
}

/// Chunk a sequence of page texts, tagging each chunk with its source
/// filename, 1-based page number, and document-wide chunk index.
pub fn chunk_pages(pages: &[String], filename: &str, params: &ChunkingParams) -> Vec<Chunk> {
    let mut all_chunks = Vec::new();
    for (page_idx, text) in pages.iter().enumerate() {
        let page_no = (page_idx + 1) as u32;
        for text_chunk in chunk_text(text, params) {
            let chunk_index = all_chunks.len() as u32;
            all_chunks.push(Chunk::new(text_chunk, filename, page_no, chunk_index));
        }
    }
    all_chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(chunk_size: usize, overlap: usize) -> ChunkingParams {
        ChunkingParams {
            chunk_size,
            overlap,
        }
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunk_text("hello world", &ChunkingParams::default());
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        assert!(chunk_text("", &ChunkingParams::default()).is_empty());
        assert!(chunk_text("   \n\t  ", &ChunkingParams::default()).is_empty());
    }

    #[test]
    fn test_windows_overlap() {
        let text = (1..=10)
            .map(|n| format!("w{}", n))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = chunk_text(&text, &params(4, 2));
        // Step is 2, so windows start at words 0, 2, 4, 6, 8.
        assert_eq!(chunks[0], "w1 w2 w3 w4");
        assert_eq!(chunks[1], "w3 w4 w5 w6");
        assert_eq!(chunks.last().unwrap(), "w9 w10");
    }

    #[test]
    fn test_overlap_larger_than_chunk_size_still_terminates() {
        let text = "a b c d e f";
        let chunks = chunk_text(text, &params(2, 5));
        // Stride clamps to 1 word.
        assert_eq!(chunks.len(), 6);
        assert_eq!(chunks[0], "a b");
        assert_eq!(chunks[5], "f");
    }

    #[test]
    fn test_chunking_is_deterministic() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(200);
        let p = params(50, 10);
        assert_eq!(chunk_text(&text, &p), chunk_text(&text, &p));
    }

    #[test]
    fn test_page_numbers_match_input_order() {
        let pages = vec![
            "first page text".to_string(),
            String::new(),
            "third page text".to_string(),
        ];
        let chunks = chunk_pages(&pages, "doc.pdf", &ChunkingParams::default());
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].metadata.page_no, 1);
        assert_eq!(chunks[1].metadata.page_no, 3);
        assert_eq!(chunks[0].metadata.chunk_index, 0);
        assert_eq!(chunks[1].metadata.chunk_index, 1);
        assert_eq!(chunks[0].metadata.filename, "doc.pdf");
    }

    #[test]
    fn test_every_page_with_words_is_represented() {
        let pages: Vec<String> = (1..=4).map(|n| format!("page {} text", n)).collect();
        let chunks = chunk_pages(&pages, "doc.pdf", &ChunkingParams::default());
        let page_nos: Vec<u32> = chunks.iter().map(|c| c.metadata.page_no).collect();
        assert_eq!(page_nos, vec![1, 2, 3, 4]);
    }
}
