//! Format-specific text extraction.
//!
//! Each supported input format turns raw file content into zero or
//! more plain-text segments for the splitter. Markup sources go
//! through the external renderer and the HTML converter; element
//! metadata yields one segment per entity description. Extraction
//! failures are per-file: the pipeline logs them and moves on.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::html;
use crate::models::DocumentKind;
use crate::render::{RenderOptions, Renderer};

/// Extraction failure for one file. Never aborts sibling files.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("markup rendering failed: {0}")]
    Render(String),
    #[error("malformed element metadata: {0}")]
    ElementMeta(#[from] serde_json::Error),
}

/// Extract plain-text segments from one file's raw content.
pub async fn extract_segments(
    kind: DocumentKind,
    raw: &str,
    path: &Path,
    renderer: &dyn Renderer,
    attributes: &[String],
) -> Result<Vec<String>, ExtractError> {
    match kind {
        DocumentKind::Markup => extract_markup(raw, path, renderer, attributes).await,
        DocumentKind::ElementMeta => extract_element_meta(raw),
    }
}

/// Markup extraction: strip the leading front-matter block, render to
/// HTML via the external renderer, convert to plain text. The whole
/// body is one segment; the renderer does not expose section structure
/// across the subprocess boundary.
async fn extract_markup(
    raw: &str,
    path: &Path,
    renderer: &dyn Renderer,
    attributes: &[String],
) -> Result<Vec<String>, ExtractError> {
    let source = strip_front_matter(raw);

    let opts = RenderOptions {
        base_dir: path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf(),
        attributes: attributes.to_vec(),
    };
    let rendered = renderer
        .render(source, &opts)
        .await
        .map_err(|e| ExtractError::Render(e.to_string()))?;

    let text = html::to_text(&rendered);
    if text.trim().is_empty() {
        Ok(Vec::new())
    } else {
        Ok(vec![text])
    }
}

/// Structured element-metadata record: a collection of named entities,
/// each carrying a free-text description.
#[derive(Debug, Deserialize)]
struct ElementAnalysis {
    elements: Vec<ElementEntry>,
}

#[derive(Debug, Deserialize)]
struct ElementEntry {
    #[serde(default)]
    #[allow(dead_code)]
    name: String,
    #[serde(default)]
    description: String,
}

/// One segment per non-empty entity description.
fn extract_element_meta(raw: &str) -> Result<Vec<String>, ExtractError> {
    let analysis: ElementAnalysis = serde_json::from_str(raw)?;
    Ok(analysis
        .elements
        .into_iter()
        .map(|e| e.description)
        .filter(|d| !d.trim().is_empty())
        .collect())
}

/// Drop a leading `---` front-matter block if present. The block is
/// document metadata for the site generator, not content.
fn strip_front_matter(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("---\n") else {
        return text;
    };
    match rest.find("\n---\n") {
        Some(end) => &rest[end + "\n---\n".len()..],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::path::PathBuf;

    /// Renderer that wraps the source in a paragraph, echoing it back.
    struct EchoRenderer;

    #[async_trait]
    impl Renderer for EchoRenderer {
        async fn render(&self, source: &str, _opts: &RenderOptions) -> Result<String> {
            Ok(format!("<p>{}</p>", source))
        }
    }

    /// Renderer that always fails, e.g. on a missing include.
    struct FailingRenderer;

    #[async_trait]
    impl Renderer for FailingRenderer {
        async fn render(&self, _source: &str, _opts: &RenderOptions) -> Result<String> {
            anyhow::bail!("include file not found: _shared.adoc")
        }
    }

    #[test]
    fn front_matter_is_stripped() {
        let text = "---\ntitle: Forms\norder: 3\n---\nBody starts here.";
        assert_eq!(strip_front_matter(text), "Body starts here.");
    }

    #[test]
    fn text_without_front_matter_is_untouched() {
        let text = "= Heading\n\nBody.";
        assert_eq!(strip_front_matter(text), text);
    }

    #[test]
    fn unterminated_front_matter_is_kept() {
        let text = "---\ntitle: broken\nno terminator";
        assert_eq!(strip_front_matter(text), text);
    }

    #[tokio::test]
    async fn markup_extraction_yields_one_segment() {
        let segments = extract_segments(
            DocumentKind::Markup,
            "Some rendered documentation body.",
            &PathBuf::from("docs/react/forms.adoc"),
            &EchoRenderer,
            &[],
        )
        .await
        .unwrap();
        assert_eq!(segments, vec!["Some rendered documentation body.".to_string()]);
    }

    #[tokio::test]
    async fn render_failure_becomes_extract_error() {
        let err = extract_segments(
            DocumentKind::Markup,
            "content",
            &PathBuf::from("docs/broken.adoc"),
            &FailingRenderer,
            &[],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExtractError::Render(_)));
        assert!(err.to_string().contains("include file not found"));
    }

    #[tokio::test]
    async fn element_meta_yields_one_segment_per_description() {
        let raw = r#"{
            "elements": [
                {"name": "vaadin-grid", "description": "A data grid component."},
                {"name": "vaadin-button", "description": "A clickable button."},
                {"name": "vaadin-internal", "description": "  "}
            ]
        }"#;
        let segments = extract_segments(
            DocumentKind::ElementMeta,
            raw,
            &PathBuf::from("analysis.json"),
            &EchoRenderer,
            &[],
        )
        .await
        .unwrap();
        assert_eq!(
            segments,
            vec![
                "A data grid component.".to_string(),
                "A clickable button.".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn malformed_metadata_is_an_error() {
        let err = extract_segments(
            DocumentKind::ElementMeta,
            "{ not json",
            &PathBuf::from("analysis.json"),
            &EchoRenderer,
            &[],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExtractError::ElementMeta(_)));
    }

    #[tokio::test]
    async fn empty_rendered_body_yields_no_segments() {
        let segments = extract_segments(
            DocumentKind::Markup,
            "",
            &PathBuf::from("docs/empty.adoc"),
            &EchoRenderer,
            &[],
        )
        .await
        .unwrap();
        assert!(segments.is_empty());
    }
}
