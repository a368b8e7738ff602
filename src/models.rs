//! Core data types flowing through the ingestion pipeline.

use serde::Serialize;

/// Input format detected from a file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// AsciiDoc markup source (`.adoc`, `.asciidoc`), rendered to HTML
    /// and converted to plain text before splitting.
    Markup,
    /// Structured element-metadata record (`.json`): a list of named
    /// entities, each with a free-text description.
    ElementMeta,
}

impl DocumentKind {
    /// Detect the format from a file extension, or `None` for
    /// unsupported files (skipped, not an error).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "adoc" | "asciidoc" => Some(Self::Markup),
            "json" => Some(Self::ElementMeta),
            _ => None,
        }
    }
}

/// A size-bounded slice of extracted text destined for one embedding.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Position within the file's chunk sequence (diagnostic ordering
    /// only; chunks are never reassembled).
    pub position: usize,
    /// Original chunk text as stored in the index. Newline
    /// normalization is applied only to the copy sent for embedding.
    pub text: String,
}

/// Metadata persisted alongside each vector.
#[derive(Debug, Clone, Serialize)]
pub struct RecordMetadata {
    /// Source file path the chunk was extracted from.
    pub path: String,
    /// The chunk's original text.
    pub text: String,
}

/// The unit of persistence: one (id, vector, metadata) tuple upserted
/// into the vector index. Identity is a fresh UUID per record per run;
/// re-ingestion creates new records rather than updating old ones.
#[derive(Debug, Clone, Serialize)]
pub struct IndexRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: RecordMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_detection_by_extension() {
        assert_eq!(DocumentKind::from_extension("adoc"), Some(DocumentKind::Markup));
        assert_eq!(
            DocumentKind::from_extension("asciidoc"),
            Some(DocumentKind::Markup)
        );
        assert_eq!(
            DocumentKind::from_extension("json"),
            Some(DocumentKind::ElementMeta)
        );
        assert_eq!(DocumentKind::from_extension("png"), None);
        assert_eq!(DocumentKind::from_extension("md"), None);
    }
}
