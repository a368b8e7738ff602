//! End-to-end pipeline tests with mock collaborators.
//!
//! The renderer, embedding client, and vector index are replaced with
//! deterministic fakes so the full walk → extract → split → embed →
//! upsert path runs offline.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use tempfile::TempDir;

use docdex::config::{
    ChunkingConfig, Config, EmbeddingConfig, IndexConfig, NamespaceConfig, RenderConfig,
    WalkerConfig,
};
use docdex::embedding::EmbeddingClient;
use docdex::index::MemoryIndex;
use docdex::ingest::{run_ingest, IngestOptions};
use docdex::render::{RenderOptions, Renderer};

/// Renderer fake: wraps each blank-line-separated paragraph in a `<p>`
/// element, like the real renderer's HTML output. Sources containing
/// an `include::` directive fail, mimicking a missing include file.
struct MockRenderer;

#[async_trait]
impl Renderer for MockRenderer {
    async fn render(&self, source: &str, _opts: &RenderOptions) -> Result<String> {
        if source.contains("include::") {
            anyhow::bail!("include file not found");
        }
        let html: String = source
            .split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .map(|p| format!("<p>{}</p>", p))
            .collect();
        Ok(html)
    }
}

/// Embedding fake: deterministic 3-dim vectors, recording every batch
/// it receives.
#[derive(Default)]
struct MockEmbeddings {
    calls: AtomicUsize,
    batches: Mutex<Vec<Vec<String>>>,
}

impl MockEmbeddings {
    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingClient for MockEmbeddings {
    fn dims(&self) -> usize {
        3
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches.lock().unwrap().push(texts.to_vec());
        Ok(texts
            .iter()
            .map(|t| vec![t.len() as f32, 0.0, 1.0])
            .collect())
    }
}

fn write_file(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn test_config(root: PathBuf) -> Config {
    Config {
        index: IndexConfig {
            name: "docs".to_string(),
            dims: 3,
            indexed_fields: vec!["path".to_string()],
            base_namespace: "hilla".to_string(),
        },
        chunking: ChunkingConfig {
            chunk_size: 2000,
            chunk_overlap: 100,
            min_chunk_len: 10,
        },
        embedding: EmbeddingConfig {
            batch_size: 64,
            ..Default::default()
        },
        walker: WalkerConfig {
            roots: vec![root],
            follow_symlinks: false,
            exclude_globs: Vec::new(),
            concurrency: 2,
        },
        namespace: NamespaceConfig {
            excluded: vec!["hilla".to_string()],
            ..Default::default()
        },
        render: RenderConfig::default(),
    }
}

#[tokio::test]
async fn small_file_yields_one_chunk_one_record() {
    let tmp = TempDir::new().unwrap();
    write_file(
        &tmp.path().join("react/forms.adoc"),
        "A concise guide to building forms with validation.",
    );

    let cfg = test_config(tmp.path().to_path_buf());
    let embedder = MockEmbeddings::default();
    let index = MemoryIndex::new();

    let stats = run_ingest(&cfg, &MockRenderer, &embedder, &index, &IngestOptions::default())
        .await
        .unwrap();

    assert_eq!(stats.files_discovered, 1);
    assert_eq!(stats.files_ingested, 1);
    assert_eq!(stats.chunks_indexed, 1);
    assert_eq!(embedder.call_count(), 1);
    assert_eq!(index.ensure_calls(), 1);
    assert_eq!(index.upsert_calls(), 1);

    let records = index.records_in("hilla-react");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].values.len(), 3);
    assert!(records[0].metadata.path.ends_with("react/forms.adoc"));
    assert_eq!(
        records[0].metadata.text,
        "A concise guide to building forms with validation."
    );
    assert!(!records[0].id.is_empty());
}

#[tokio::test]
async fn long_unbroken_text_splits_into_overlapping_chunks() {
    let tmp = TempDir::new().unwrap();
    // 4500 chars with no separators at all: the splitter must fall
    // back to fixed-size windows.
    write_file(&tmp.path().join("react/blob.adoc"), &"a".repeat(4500));

    let cfg = test_config(tmp.path().to_path_buf());
    let embedder = MockEmbeddings::default();
    let index = MemoryIndex::new();

    let stats = run_ingest(&cfg, &MockRenderer, &embedder, &index, &IngestOptions::default())
        .await
        .unwrap();

    assert_eq!(stats.files_ingested, 1);
    assert_eq!(stats.chunks_indexed, 3);

    let records = index.records_in("hilla-react");
    assert_eq!(records.len(), 3);
    for record in &records {
        assert!(record.metadata.text.len() <= 2000);
    }
    // Consecutive chunks share exactly the configured overlap.
    for pair in records.windows(2) {
        let prev = &pair[0].metadata.text;
        let next = &pair[1].metadata.text;
        assert_eq!(prev[prev.len() - 100..], next[..100]);
    }
}

#[tokio::test]
async fn tiny_descriptions_are_filtered_not_indexed() {
    let tmp = TempDir::new().unwrap();
    write_file(
        &tmp.path().join("react/analysis.json"),
        r#"{
            "elements": [
                {"name": "a", "description": "short"},
                {"name": "b", "description": "tiny"},
                {"name": "c", "description": ""}
            ]
        }"#,
    );

    let cfg = test_config(tmp.path().to_path_buf());
    let embedder = MockEmbeddings::default();
    let index = MemoryIndex::new();

    let stats = run_ingest(&cfg, &MockRenderer, &embedder, &index, &IngestOptions::default())
        .await
        .unwrap();

    // Every description is below the noise threshold.
    assert_eq!(stats.files_skipped, 1);
    assert_eq!(stats.files_ingested, 0);
    assert_eq!(embedder.call_count(), 0);
    assert_eq!(index.upsert_calls(), 0);
}

#[tokio::test]
async fn failing_file_does_not_block_siblings() {
    let tmp = TempDir::new().unwrap();
    write_file(
        &tmp.path().join("react/broken.adoc"),
        "include::missing.adoc[]",
    );
    write_file(
        &tmp.path().join("react/good.adoc"),
        "This sibling document indexes without any trouble at all.",
    );

    let cfg = test_config(tmp.path().to_path_buf());
    let embedder = MockEmbeddings::default();
    let index = MemoryIndex::new();

    let stats = run_ingest(&cfg, &MockRenderer, &embedder, &index, &IngestOptions::default())
        .await
        .unwrap();

    assert_eq!(stats.files_discovered, 2);
    assert_eq!(stats.files_failed, 1);
    assert_eq!(stats.files_ingested, 1);

    let records = index.records_in("hilla-react");
    assert_eq!(records.len(), 1);
    assert!(records[0].metadata.path.ends_with("good.adoc"));
}

#[tokio::test]
async fn stored_text_keeps_newlines_while_embedder_gets_flat_copies() {
    let tmp = TempDir::new().unwrap();
    write_file(
        &tmp.path().join("react/layout.adoc"),
        "First line of the paragraph\nsecond line of the paragraph.",
    );

    let cfg = test_config(tmp.path().to_path_buf());
    let embedder = MockEmbeddings::default();
    let index = MemoryIndex::new();

    run_ingest(&cfg, &MockRenderer, &embedder, &index, &IngestOptions::default())
        .await
        .unwrap();

    let records = index.records_in("hilla-react");
    assert_eq!(records.len(), 1);
    assert!(records[0].metadata.text.contains('\n'));

    let batches = embedder.batches();
    assert_eq!(batches.len(), 1);
    assert!(!batches[0][0].contains('\n'));
    assert_eq!(batches[0][0], records[0].metadata.text.replace('\n', " "));
}

#[tokio::test]
async fn variant_directories_land_in_separate_namespaces() {
    let tmp = TempDir::new().unwrap();
    write_file(
        &tmp.path().join("react/grid.adoc"),
        "Using the data grid from the React flavor of the docs.",
    );
    write_file(
        &tmp.path().join("lit/grid.adoc"),
        "Using the data grid from the Lit flavor of the docs.",
    );
    // No variant marker: resolves to the excluded bare namespace.
    write_file(
        &tmp.path().join("index.adoc"),
        "Umbrella landing page that must never be indexed.",
    );

    let cfg = test_config(tmp.path().to_path_buf());
    let embedder = MockEmbeddings::default();
    let index = MemoryIndex::new();

    let stats = run_ingest(&cfg, &MockRenderer, &embedder, &index, &IngestOptions::default())
        .await
        .unwrap();

    assert_eq!(stats.files_ingested, 2);
    assert_eq!(stats.files_skipped, 1);
    assert_eq!(
        index.namespaces(),
        vec!["hilla-lit".to_string(), "hilla-react".to_string()]
    );
    assert_eq!(index.records_in("hilla-react").len(), 1);
    assert_eq!(index.records_in("hilla-lit").len(), 1);
}

#[tokio::test]
async fn per_file_chunks_are_sub_batched_but_upserted_once() {
    let tmp = TempDir::new().unwrap();
    let paragraphs: Vec<String> = (0..5)
        .map(|i| format!("Paragraph number {} with filler text.", i))
        .collect();
    write_file(
        &tmp.path().join("react/long.adoc"),
        &paragraphs.join("\n\n"),
    );

    let mut cfg = test_config(tmp.path().to_path_buf());
    cfg.chunking.chunk_size = 50;
    cfg.chunking.chunk_overlap = 5;
    cfg.embedding.batch_size = 2;

    let embedder = MockEmbeddings::default();
    let index = MemoryIndex::new();

    let stats = run_ingest(&cfg, &MockRenderer, &embedder, &index, &IngestOptions::default())
        .await
        .unwrap();

    assert_eq!(stats.files_ingested, 1);
    assert_eq!(stats.chunks_indexed, 5);
    // 5 chunks at batch_size 2 → three embedding calls, one upsert.
    assert_eq!(embedder.call_count(), 3);
    assert_eq!(index.upsert_calls(), 1);
    assert_eq!(index.records_in("hilla-react").len(), 5);
}

#[tokio::test]
async fn dry_run_counts_chunks_without_embedding_or_upserting() {
    let tmp = TempDir::new().unwrap();
    write_file(
        &tmp.path().join("react/forms.adoc"),
        "A concise guide to building forms with validation.",
    );

    let cfg = test_config(tmp.path().to_path_buf());
    let embedder = MockEmbeddings::default();
    let index = MemoryIndex::new();

    let options = IngestOptions {
        dry_run: true,
        ..Default::default()
    };
    let stats = run_ingest(&cfg, &MockRenderer, &embedder, &index, &options)
        .await
        .unwrap();

    assert_eq!(stats.files_ingested, 1);
    assert_eq!(stats.chunks_indexed, 1);
    assert_eq!(embedder.call_count(), 0);
    assert_eq!(index.ensure_calls(), 0);
    assert_eq!(index.upsert_calls(), 0);
}

#[tokio::test]
async fn limit_caps_the_number_of_files_processed() {
    let tmp = TempDir::new().unwrap();
    for name in ["a", "b", "c"] {
        write_file(
            &tmp.path().join(format!("react/{}.adoc", name)),
            "Enough text in this file to clear the noise threshold.",
        );
    }

    let cfg = test_config(tmp.path().to_path_buf());
    let embedder = MockEmbeddings::default();
    let index = MemoryIndex::new();

    let options = IngestOptions {
        limit: Some(2),
        ..Default::default()
    };
    let stats = run_ingest(&cfg, &MockRenderer, &embedder, &index, &options)
        .await
        .unwrap();

    assert_eq!(stats.files_discovered, 2);
    assert_eq!(stats.files_ingested, 2);
    assert_eq!(index.records_in("hilla-react").len(), 2);
}

#[tokio::test]
async fn namespace_override_bypasses_resolution() {
    let tmp = TempDir::new().unwrap();
    write_file(
        &tmp.path().join("react/grid.adoc"),
        "Using the data grid from the React flavor of the docs.",
    );
    write_file(
        &tmp.path().join("index.adoc"),
        "Landing page normally excluded by the resolver.",
    );

    let cfg = test_config(tmp.path().to_path_buf());
    let embedder = MockEmbeddings::default();
    let index = MemoryIndex::new();

    let options = IngestOptions {
        namespace: Some("hilla-canary".to_string()),
        ..Default::default()
    };
    let stats = run_ingest(&cfg, &MockRenderer, &embedder, &index, &options)
        .await
        .unwrap();

    assert_eq!(stats.files_ingested, 2);
    assert_eq!(stats.files_skipped, 0);
    assert_eq!(index.namespaces(), vec!["hilla-canary".to_string()]);
    assert_eq!(index.records_in("hilla-canary").len(), 2);
}

#[tokio::test]
async fn front_matter_only_file_is_skipped() {
    let tmp = TempDir::new().unwrap();
    write_file(
        &tmp.path().join("react/meta-only.adoc"),
        "---\ntitle: Placeholder\norder: 9\n---\n",
    );

    let cfg = test_config(tmp.path().to_path_buf());
    let embedder = MockEmbeddings::default();
    let index = MemoryIndex::new();

    let stats = run_ingest(&cfg, &MockRenderer, &embedder, &index, &IngestOptions::default())
        .await
        .unwrap();

    assert_eq!(stats.files_skipped, 1);
    assert_eq!(embedder.call_count(), 0);
    assert_eq!(index.upsert_calls(), 0);
}
