//! Token-counted text chunking with separator-priority splitting

use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};
use crate::types::{Chunk, Page};

/// Separators tried in priority order; token-by-token splitting is the
/// last resort when no separator yields pieces that fit.
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// Splits page text into overlapping chunks measured in tokens.
///
/// A token is a non-whitespace UAX#29 word-bound segment, so the count is
/// deterministic for a fixed input. Higher-priority separators are split
/// on first; a lower-priority one is used only for pieces that still
/// exceed `chunk_size`.
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    /// Create a chunker, validating the size parameters.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Chunking("chunk_size must be at least 1".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::Chunking(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Chunk a sequence of pages, skipping empty ones.
    ///
    /// Each chunk inherits its page's number and a copy of its metadata.
    pub fn chunk_pages(&self, pages: &[Page]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for page in pages {
            if page.content.trim().is_empty() {
                continue;
            }
            for text in self.split_text(&page.content) {
                chunks.push(Chunk {
                    content: text,
                    page_number: page.page_number,
                    metadata: page.metadata.clone(),
                });
            }
        }
        chunks
    }

    /// Split a single text into chunk strings of at most `chunk_size`
    /// tokens, consecutive chunks sharing up to `chunk_overlap` tokens.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, &SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let Some((sep, rest)) = separators.split_first() else {
            return self.split_by_tokens(text);
        };

        let mut finished = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for part in text.split(sep) {
            if token_count(part) <= self.chunk_size {
                pending.push(part);
            } else {
                if !pending.is_empty() {
                    finished.extend(self.merge(&pending, sep));
                    pending.clear();
                }
                finished.extend(self.split_with(part, rest));
            }
        }
        if !pending.is_empty() {
            finished.extend(self.merge(&pending, sep));
        }
        finished
    }

    /// Greedily pack pieces into chunks, carrying trailing pieces forward
    /// as overlap for the next chunk.
    fn merge(&self, pieces: &[&str], sep: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: Vec<&str> = Vec::new();
        let mut window_tokens = 0usize;

        for &piece in pieces {
            let piece_tokens = token_count(piece);
            if window_tokens + piece_tokens > self.chunk_size && !window.is_empty() {
                let joined = window.join(sep);
                let trimmed = joined.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
                while window_tokens > self.chunk_overlap
                    || (window_tokens + piece_tokens > self.chunk_size && window_tokens > 0)
                {
                    window_tokens -= token_count(window.remove(0));
                }
            }
            window.push(piece);
            window_tokens += piece_tokens;
        }

        let joined = window.join(sep);
        let trimmed = joined.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        chunks
    }

    /// Last-resort split for a run of tokens longer than `chunk_size`
    /// with no usable separator.
    fn split_by_tokens(&self, text: &str) -> Vec<String> {
        let spans = token_spans(text);
        if spans.is_empty() {
            return Vec::new();
        }

        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0usize;
        loop {
            let end = (start + self.chunk_size).min(spans.len());
            let slice = &text[spans[start].0..spans[end - 1].1];
            let trimmed = slice.trim();
            if !trimmed.is_empty() {
                chunks.push(trimmed.to_string());
            }
            if end == spans.len() {
                break;
            }
            start += step;
        }
        chunks
    }
}

/// Byte spans of the non-whitespace word-bound segments of `text`.
fn token_spans(text: &str) -> Vec<(usize, usize)> {
    text.split_word_bound_indices()
        .filter(|(_, s)| !s.trim().is_empty())
        .map(|(i, s)| (i, i + s.len()))
        .collect()
}

fn token_count(text: &str) -> usize {
    text.split_word_bound_indices()
        .filter(|(_, s)| !s.trim().is_empty())
        .count()
}
