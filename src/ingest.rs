//! Pipeline orchestration: walk, extract, split, embed, upsert.
//!
//! One run processes every eligible file under the configured roots.
//! Files are independent: a failure in one is logged and counted, and
//! the rest of the run continues. Within a file the embed-and-upsert
//! step is all-or-nothing, so the index never holds a partial file.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::embedding::EmbeddingClient;
use crate::extract;
use crate::index::VectorIndex;
use crate::models::{Chunk, IndexRecord, RecordMetadata};
use crate::namespace::NamespaceResolver;
use crate::render::Renderer;
use crate::splitter::TextSplitter;
use crate::walker;

/// Run-level options from the command line, not the config file.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Walk, extract, and split, but skip embedding and upserts.
    pub dry_run: bool,
    /// Process at most this many files.
    pub limit: Option<usize>,
    /// Force every file into this namespace, bypassing the resolver.
    pub namespace: Option<String>,
}

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, Copy)]
pub struct IngestStats {
    pub files_discovered: usize,
    pub files_ingested: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub chunks_indexed: usize,
}

enum FileOutcome {
    Ingested { chunks: usize },
    Skipped,
    Failed,
}

/// Ingest every eligible file under the configured roots into the
/// vector index. Returns counters; per-file failures are reflected in
/// `files_failed`, not in the `Result`.
pub async fn run_ingest(
    config: &Config,
    renderer: &dyn Renderer,
    embedder: &dyn EmbeddingClient,
    index: &dyn VectorIndex,
    options: &IngestOptions,
) -> Result<IngestStats> {
    if !options.dry_run {
        if embedder.dims() != config.index.dims {
            anyhow::bail!(
                "embedding dimensionality {} does not match index.dims {}",
                embedder.dims(),
                config.index.dims
            );
        }
        index
            .ensure_index(
                &config.index.name,
                config.index.dims,
                &config.index.indexed_fields,
            )
            .await
            .with_context(|| format!("Failed to ensure index '{}'", config.index.name))?;
    }

    let mut files = walker::discover(
        &config.walker.roots,
        config.walker.follow_symlinks,
        &config.walker.exclude_globs,
    )?;
    if let Some(limit) = options.limit {
        files.truncate(limit);
    }

    let mut stats = IngestStats {
        files_discovered: files.len(),
        ..Default::default()
    };

    let resolver = Arc::new(NamespaceResolver::new(
        config.index.base_namespace.clone(),
        config.namespace.rules.clone(),
        config.namespace.excluded.clone(),
    ));
    let splitter = Arc::new(TextSplitter::new(
        config.chunking.chunk_size,
        config.chunking.chunk_overlap,
    ));

    let outcomes = stream::iter(files.into_iter().map(|path| {
        let resolver = Arc::clone(&resolver);
        let splitter = Arc::clone(&splitter);
        async move {
            process_file(
                &path, config, &resolver, &splitter, renderer, embedder, index, options,
            )
            .await
        }
    }))
    .buffer_unordered(config.walker.concurrency)
    .collect::<Vec<_>>()
    .await;

    for outcome in outcomes {
        match outcome {
            FileOutcome::Ingested { chunks } => {
                stats.files_ingested += 1;
                stats.chunks_indexed += chunks;
            }
            FileOutcome::Skipped => stats.files_skipped += 1,
            FileOutcome::Failed => stats.files_failed += 1,
        }
    }

    Ok(stats)
}

#[allow(clippy::too_many_arguments)]
async fn process_file(
    path: &Path,
    config: &Config,
    resolver: &NamespaceResolver,
    splitter: &TextSplitter,
    renderer: &dyn Renderer,
    embedder: &dyn EmbeddingClient,
    index: &dyn VectorIndex,
    options: &IngestOptions,
) -> FileOutcome {
    let namespace = match &options.namespace {
        Some(forced) => forced.clone(),
        None => match resolver.resolve(path) {
            Some(ns) => ns,
            None => {
                debug!(path = %path.display(), "namespace excluded, skipping");
                return FileOutcome::Skipped;
            }
        },
    };

    let Some(kind) = walker::detect_kind(path) else {
        return FileOutcome::Skipped;
    };

    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read file");
            return FileOutcome::Failed;
        }
    };

    let segments =
        match extract::extract_segments(kind, &raw, path, renderer, &config.render.attributes)
            .await
        {
            Ok(segments) => segments,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "extraction failed");
                return FileOutcome::Failed;
            }
        };

    let chunks = split_segments(&segments, splitter, config.chunking.min_chunk_len);
    if chunks.is_empty() {
        info!(path = %path.display(), "no indexable text, skipping");
        return FileOutcome::Skipped;
    }

    if options.dry_run {
        info!(
            path = %path.display(),
            namespace = %namespace,
            chunks = chunks.len(),
            "dry run, not indexing"
        );
        return FileOutcome::Ingested {
            chunks: chunks.len(),
        };
    }

    let vectors = match embed_chunks(&chunks, embedder, config.embedding.batch_size).await {
        Ok(vectors) => vectors,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "embedding failed");
            return FileOutcome::Failed;
        }
    };

    let records = build_records(path, &chunks, vectors);
    if let Err(e) = index.upsert(&records, &namespace).await {
        warn!(path = %path.display(), error = %e, "upsert failed");
        return FileOutcome::Failed;
    }

    info!(
        path = %path.display(),
        namespace = %namespace,
        chunks = records.len(),
        "indexed"
    );
    FileOutcome::Ingested {
        chunks: records.len(),
    }
}

/// Split every extracted segment and drop chunks below the noise
/// threshold. Positions number the surviving chunks across the file.
fn split_segments(segments: &[String], splitter: &TextSplitter, min_chunk_len: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for segment in segments {
        for text in splitter.split(segment) {
            if text.len() < min_chunk_len {
                continue;
            }
            chunks.push(Chunk {
                position: chunks.len(),
                text,
            });
        }
    }
    chunks
}

/// Embed all of a file's chunks, sub-batching to respect the
/// provider's request limit. Newlines are flattened only in the copies
/// sent to the provider; the stored text keeps the original layout.
/// Any sub-batch failure fails the whole file.
async fn embed_chunks(
    chunks: &[Chunk],
    embedder: &dyn EmbeddingClient,
    batch_size: usize,
) -> Result<Vec<Vec<f32>>> {
    let inputs: Vec<String> = chunks
        .iter()
        .map(|c| c.text.replace('\n', " "))
        .collect();

    let mut vectors = Vec::with_capacity(inputs.len());
    for batch in inputs.chunks(batch_size) {
        vectors.extend(embedder.embed(batch).await?);
    }
    Ok(vectors)
}

fn build_records(path: &Path, chunks: &[Chunk], vectors: Vec<Vec<f32>>) -> Vec<IndexRecord> {
    chunks
        .iter()
        .zip(vectors)
        .map(|(chunk, values)| IndexRecord {
            id: Uuid::new_v4().to_string(),
            values,
            metadata: RecordMetadata {
                path: path.display().to_string(),
                text: chunk.text.clone(),
            },
        })
        .collect()
}

/// Print the run summary block.
pub fn print_summary(stats: &IngestStats) {
    println!("Ingest complete:");
    println!("  Files discovered: {}", stats.files_discovered);
    println!("  Files ingested:   {}", stats.files_ingested);
    println!("  Files skipped:    {}", stats.files_skipped);
    println!("  Files failed:     {}", stats.files_failed);
    println!("  Chunks indexed:   {}", stats.chunks_indexed);
}
