//! # Docdex CLI (`ddx`)
//!
//! The `ddx` binary drives the documentation ingestion pipeline.
//!
//! ## Usage
//!
//! ```bash
//! ddx --config ./config/ddx.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ddx init` | Create the vector index (idempotent) |
//! | `ddx ingest` | Walk the docs tree, chunk, embed, and upsert |
//!
//! ## Examples
//!
//! ```bash
//! # Create the index
//! ddx init --config ./config/ddx.toml
//!
//! # Full ingestion run
//! ddx ingest --config ./config/ddx.toml
//!
//! # Count files and chunks without touching any remote API
//! ddx ingest --dry-run
//!
//! # Smoke-test the first ten files
//! ddx ingest --limit 10
//! ```

use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use docdex::config;
use docdex::embedding::{EmbeddingClient, OpenAiEmbeddings};
use docdex::index::{MemoryIndex, PineconeIndex, VectorIndex};
use docdex::ingest::{self, IngestOptions};
use docdex::render::AsciidoctorRenderer;

/// Docdex CLI — a documentation ingestion pipeline for vector search.
///
/// All commands accept a `--config` flag pointing to a TOML
/// configuration file. See `config/ddx.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "ddx",
    about = "Docdex — a documentation ingestion pipeline for vector search",
    version,
    long_about = "Docdex walks a documentation tree, extracts plain text from AsciiDoc and \
    element-metadata sources, splits it into bounded overlapping chunks, embeds each chunk, \
    and upserts the records into a namespaced vector index."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/ddx.toml`. All index, chunking, embedding,
    /// and walker settings are read from this file.
    #[arg(long, global = true, default_value = "./config/ddx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Create the vector index.
    ///
    /// Creates the index with the configured dimensionality and indexed
    /// metadata fields. This command is idempotent — running it
    /// multiple times is safe.
    Init,

    /// Ingest the documentation tree into the vector index.
    ///
    /// Walks the configured roots, extracts plain text, splits it into
    /// chunks, embeds them, and upserts the records under the resolved
    /// namespaces. Per-file failures are logged and counted; the run
    /// exits non-zero if any file failed.
    Ingest {
        /// Walk, extract, and split, but skip embedding and upserts.
        /// Requires no API credentials.
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of files to process.
        #[arg(long)]
        limit: Option<usize>,

        /// Upsert everything under this namespace, bypassing the
        /// variant rules and exclusions from config.
        #[arg(long)]
        namespace: Option<String>,
    },
}

/// Stand-in embedder for dry runs; the pipeline never calls it.
struct DisabledEmbeddings;

#[async_trait]
impl EmbeddingClient for DisabledEmbeddings {
    fn dims(&self) -> usize {
        0
    }

    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        anyhow::bail!("embedding is disabled in dry-run mode")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let index = PineconeIndex::connect(&cfg.index, cfg.embedding.timeout_secs).await?;
            index
                .ensure_index(&cfg.index.name, cfg.index.dims, &cfg.index.indexed_fields)
                .await?;
            println!("Index '{}' ready.", cfg.index.name);
        }
        Commands::Ingest {
            dry_run,
            limit,
            namespace,
        } => {
            let renderer = AsciidoctorRenderer::new(&cfg.render);
            let options = IngestOptions {
                dry_run,
                limit,
                namespace,
            };

            let stats = if dry_run {
                let index = MemoryIndex::new();
                ingest::run_ingest(&cfg, &renderer, &DisabledEmbeddings, &index, &options).await?
            } else {
                let embedder = OpenAiEmbeddings::new(&cfg.embedding, cfg.index.dims)?;
                let index =
                    PineconeIndex::connect(&cfg.index, cfg.embedding.timeout_secs).await?;
                ingest::run_ingest(&cfg, &renderer, &embedder, &index, &options).await?
            };

            ingest::print_summary(&stats);
            if stats.files_failed > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
