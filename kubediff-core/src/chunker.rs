//! Line-preserving packing of long text into budgeted chunks.
//!
//! The budget is a count of Unicode scalar values per chunk. By default it is
//! measured over line content only; [`Chunker::counting_terminators`] makes each
//! line's `\n` count as well, so the budget bounds the full chunk text. Lines
//! are never split: a single line longer than the budget is emitted as its own
//! oversized chunk.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("chunk budget must be at least one character")]
    ZeroBudget,
}

/// Greedy packer that splits text into chunks of at most `max_chars` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    max_chars: usize,
    count_terminators: bool,
}

impl Chunker {
    pub fn new(max_chars: usize) -> Result<Self, ChunkError> {
        if max_chars == 0 {
            return Err(ChunkError::ZeroBudget);
        }
        Ok(Self {
            max_chars,
            count_terminators: false,
        })
    }

    /// Charge one extra character per line for its `\n`.
    pub fn counting_terminators(self) -> Self {
        Self {
            count_terminators: true,
            ..self
        }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Split `text` on `\n` and pack the lines in order.
    ///
    /// Every returned chunk ends with `\n`. The result is never empty:
    /// `chunk("")` yields a single `"\n"`.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_chars = 0usize;

        for line in text.split('\n') {
            let chars = line.chars().count() + usize::from(self.count_terminators);
            if current_chars + chars > self.max_chars && !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_chars = 0;
            }
            current.push_str(line);
            current.push('\n');
            current_chars += chars;
        }

        chunks.push(current);
        chunks
    }
}
