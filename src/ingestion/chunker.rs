//! Text chunking with page tracking
//!
//! Chunks are bounded by `max_chunk_size` characters and consecutive chunks
//! within a segment overlap by `overlap` characters. Cut points prefer
//! paragraph breaks, then sentence boundaries, then a hard character cut
//! when no natural breakpoint exists in the window.

use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;

use super::extractor::ExtractedSegment;

/// A bounded-length text chunk, the unit fed to the embedding service
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Chunk text
    pub text: String,
    /// Page inherited from the source segment
    pub page: Option<u32>,
    /// Position in the flat chunk sequence
    pub index: u32,
}

/// Text chunker with configurable size and overlap
pub struct TextChunker {
    max_chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker. The overlap is clamped below the chunk size so
    /// every cut makes forward progress.
    pub fn new(max_chunk_size: usize, overlap: usize) -> Self {
        let max_chunk_size = max_chunk_size.max(1);
        Self {
            max_chunk_size,
            overlap: overlap.min(max_chunk_size.saturating_sub(1)),
        }
    }

    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.max_chunk_size, config.overlap)
    }

    /// Chunk ordered segments into a flat ordered chunk sequence.
    ///
    /// Each segment is chunked independently so page attribution stays with
    /// the source segment; a segment shorter than the chunk size becomes one
    /// chunk with no overlap logic applied. Empty input yields an empty
    /// sequence.
    pub fn chunk_segments(&self, segments: &[ExtractedSegment]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut index = 0u32;

        for segment in segments {
            if segment.text.trim().is_empty() {
                continue;
            }
            for piece in self.split_text(&segment.text) {
                chunks.push(Chunk {
                    text: piece,
                    page: segment.page,
                    index,
                });
                index += 1;
            }
        }

        chunks
    }

    /// Split one text into bounded, overlapping pieces
    fn split_text(&self, text: &str) -> Vec<String> {
        if text.len() <= self.max_chunk_size {
            return vec![text.to_string()];
        }

        let mut pieces = Vec::new();
        let mut start = 0usize;

        loop {
            if text.len() - start <= self.max_chunk_size {
                pieces.push(text[start..].to_string());
                break;
            }

            let end = self.find_break(text, start);
            pieces.push(text[start..end].to_string());

            // Step back by the overlap for the next piece, staying on a
            // character boundary and always making forward progress.
            let mut next = end.saturating_sub(self.overlap);
            while next > start && !text.is_char_boundary(next) {
                next -= 1;
            }
            if next <= start {
                next = end;
            }
            start = next;
        }

        pieces
    }

    /// Find the cut point for a piece starting at `start`.
    ///
    /// Preference order: last paragraph break in the window, last sentence
    /// boundary, hard cut at the window limit. Natural breaks closer than
    /// `overlap` characters from the start are rejected so the overlap
    /// step-back cannot stall the scan.
    fn find_break(&self, text: &str, start: usize) -> usize {
        let mut limit = start + self.max_chunk_size;
        while !text.is_char_boundary(limit) {
            limit -= 1;
        }
        if limit <= start {
            // A chunk size smaller than one multi-byte character still
            // has to consume something.
            let first = text[start..].chars().next().map(|c| c.len_utf8()).unwrap_or(1);
            limit = start + first;
        }

        let window = &text[start..limit];
        let min_cut = (self.overlap + 1).min(window.len());

        if let Some(pos) = window.rfind("\n\n") {
            let cut = pos + 2;
            if cut >= min_cut {
                return start + cut;
            }
        }

        let mut sentence_cut = None;
        for (offset, _) in window.split_sentence_bound_indices() {
            if offset >= min_cut {
                sentence_cut = Some(offset);
            }
        }
        if let Some(cut) = sentence_cut {
            return start + cut;
        }

        limit
    }
}

/// Assemble the canonical stored content: chunk texts joined with a blank
/// line, approximating original document order.
pub fn assemble_content(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(page: Option<u32>, text: &str) -> ExtractedSegment {
        ExtractedSegment {
            page,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let chunker = TextChunker::new(6000, 200);
        assert!(chunker.chunk_segments(&[]).is_empty());
        assert!(chunker.chunk_segments(&[segment(None, "   \n ")]).is_empty());
    }

    #[test]
    fn test_short_segment_is_one_untouched_chunk() {
        let chunker = TextChunker::new(6000, 200);
        let chunks = chunker.chunk_segments(&[segment(None, "This Agreement is made today.")]);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "This Agreement is made today.");
        assert_eq!(chunks[0].index, 0);
    }

    #[test]
    fn test_two_page_document_yields_two_page_attributed_chunks() {
        let page_one = "ARTICLE I\n\n".to_string() + &"The tenant shall pay rent monthly. ".repeat(80);
        let page_two = "ARTICLE II\n\n".to_string() + &"The landlord shall maintain the premises. ".repeat(80);
        assert!(page_one.len() < 6000 && page_two.len() < 6000);

        let chunker = TextChunker::new(6000, 200);
        let chunks = chunker.chunk_segments(&[
            segment(Some(1), &page_one),
            segment(Some(2), &page_two),
        ]);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page, Some(1));
        assert_eq!(chunks[1].page, Some(2));
        assert_eq!(chunks[1].index, 1);
    }

    #[test]
    fn test_chunks_respect_size_bound_and_overlap() {
        let text = "The party of the first part agrees. ".repeat(20); // 720 chars
        let chunker = TextChunker::new(100, 20);
        let chunks = chunker.chunk_segments(&[segment(None, &text)]);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.len() <= 100, "chunk too long: {}", chunk.text.len());
        }
        // Consecutive chunks share the overlap region
        for pair in chunks.windows(2) {
            let tail: String = pair[0].text.chars().rev().take(20).collect::<Vec<_>>()
                .into_iter().rev().collect();
            assert!(
                pair[1].text.starts_with(&tail),
                "missing overlap between chunks"
            );
        }
    }

    #[test]
    fn test_overlap_removal_reconstructs_original_text() {
        let text = "Whereas the parties wish to define their obligations. ".repeat(30);
        let chunker = TextChunker::new(200, 40);
        let chunks = chunker.chunk_segments(&[segment(None, &text)]);

        let mut rebuilt = chunks[0].text.clone();
        for chunk in &chunks[1..] {
            rebuilt.push_str(&chunk.text[40..]);
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_chunking_is_deterministic() {
        let text = "Severability. If any provision is held invalid, the remainder survives. "
            .repeat(40);
        let chunker = TextChunker::new(300, 50);
        let first = chunker.chunk_segments(&[segment(Some(3), &text)]);
        let second = chunker.chunk_segments(&[segment(Some(3), &text)]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_paragraph_break_preferred_over_mid_paragraph_cut() {
        let text = format!("{}\n\n{}", "a".repeat(60), "b".repeat(80));
        let chunker = TextChunker::new(100, 10);
        let chunks = chunker.chunk_segments(&[segment(None, &text)]);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, format!("{}\n\n", "a".repeat(60)));
    }

    #[test]
    fn test_sentence_boundary_preferred_over_hard_cut() {
        let text = "The term begins on the effective date. The term ends two years later. \
                    Renewal requires written notice. Notice must arrive sixty days early."
            .to_string();
        let chunker = TextChunker::new(100, 10);
        let chunks = chunker.chunk_segments(&[segment(None, &text)]);

        assert!(chunks.len() > 1);
        assert!(chunks[0].text.trim_end().ends_with('.'));
    }

    #[test]
    fn test_hard_cut_when_no_breakpoint_exists() {
        let text = "x".repeat(250);
        let chunker = TextChunker::new(100, 20);
        let chunks = chunker.chunk_segments(&[segment(None, &text)]);

        assert_eq!(chunks[0].text.len(), 100);
        for chunk in &chunks {
            assert!(chunk.text.len() <= 100);
        }
        // Full coverage despite hard cuts
        let mut rebuilt = chunks[0].text.clone();
        for chunk in &chunks[1..] {
            rebuilt.push_str(&chunk.text[20..]);
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_hard_cut_respects_utf8_boundaries() {
        let text = "§".repeat(300); // two bytes per char
        let chunker = TextChunker::new(100, 20);
        let chunks = chunker.chunk_segments(&[segment(None, &text)]);
        for chunk in &chunks {
            assert!(chunk.text.len() <= 100);
            assert!(chunk.text.chars().all(|c| c == '§'));
        }
    }

    #[test]
    fn test_assemble_content_joins_with_blank_lines() {
        let chunks = vec![
            Chunk { text: "first".into(), page: Some(1), index: 0 },
            Chunk { text: "second".into(), page: Some(2), index: 1 },
        ];
        assert_eq!(assemble_content(&chunks), "first\n\nsecond");
        assert_eq!(assemble_content(&[]), "");
    }
}
