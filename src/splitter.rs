//! Recursive separator-aware text splitter.
//!
//! Splits extracted plain text into chunks of at most `chunk_size`
//! characters, preferring semantic boundaries in priority order:
//! paragraph breaks, line breaks, sentence-ending punctuation, word
//! boundaries, and finally raw character windows when a run contains
//! no boundary at all. Consecutive chunks carved from one unbroken run
//! share exactly `chunk_overlap` characters so no context is lost at
//! the seam.
//!
//! Splitting is pure and deterministic: no I/O, no hidden state, same
//! output for the same input every time.

/// Boundary ladder, highest priority first. Character slicing is the
/// implicit final fallback.
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "! ", "? ", " "];

/// Size-bounded overlapping text splitter.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// Create a splitter. `chunk_overlap` must be strictly less than
    /// `chunk_size` (validated again at config load).
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be > 0");
        assert!(
            chunk_overlap < chunk_size,
            "chunk_overlap must be < chunk_size"
        );
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Split `text` into ordered chunks of at most `chunk_size`
    /// characters. Empty input yields an empty vec; input already
    /// within the budget is returned verbatim as a single chunk.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        self.split_recursive(text, SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }

        // First separator in the ladder that actually occurs in the text.
        let sep_idx = match separators.iter().position(|s| text.contains(s)) {
            Some(i) => i,
            None => return self.split_chars(text),
        };
        let sep = separators[sep_idx];
        let rest = &separators[sep_idx + 1..];

        let pieces = split_keeping_separator(text, sep);

        let mut chunks = Vec::new();
        let mut small: Vec<String> = Vec::new();
        for piece in pieces {
            if char_len(&piece) <= self.chunk_size {
                small.push(piece);
            } else {
                // Flush accumulated small pieces, then descend into the
                // oversized piece with the lower-priority separators.
                if !small.is_empty() {
                    chunks.extend(self.merge(std::mem::take(&mut small)));
                }
                chunks.extend(self.split_recursive(&piece, rest));
            }
        }
        if !small.is_empty() {
            chunks.extend(self.merge(small));
        }

        chunks.retain(|c| !c.is_empty());
        chunks
    }

    /// Greedily join sibling pieces up to `chunk_size`, carrying a tail
    /// of roughly `chunk_overlap` characters into the next chunk.
    fn merge(&self, pieces: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: std::collections::VecDeque<String> = std::collections::VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(&piece);
            if total + len > self.chunk_size && !window.is_empty() {
                chunks.push(join_trimmed(&window));
                // Drop leading pieces until the retained tail fits the
                // overlap budget and leaves room for the incoming piece.
                while total > self.chunk_overlap
                    || (total + len > self.chunk_size && total > 0)
                {
                    let first = window.pop_front().expect("window not empty");
                    total -= char_len(&first);
                }
            }
            total += len;
            window.push_back(piece);
        }

        if !window.is_empty() {
            chunks.push(join_trimmed(&window));
        }

        chunks.retain(|c| !c.is_empty());
        chunks
    }

    /// Character-window fallback for a run with no split boundary.
    /// Windows of `chunk_size` advance by `chunk_size - chunk_overlap`,
    /// so adjacent windows share exactly `chunk_overlap` characters and
    /// concatenation (dropping each later window's overlap prefix)
    /// reconstructs the input losslessly.
    fn split_chars(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0usize;
        loop {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split on `sep`, keeping the separator attached to the end of each
/// preceding piece so concatenation preserves the original text.
fn split_keeping_separator(text: &str, sep: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut rest = text;
    while let Some(idx) = rest.find(sep) {
        let end = idx + sep.len();
        pieces.push(rest[..end].to_string());
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        pieces.push(rest.to_string());
    }
    pieces
}

fn join_trimmed(window: &std::collections::VecDeque<String>) -> String {
    let mut out = String::new();
    for piece in window {
        out.push_str(piece);
    }
    out.trim().to_string()
}
