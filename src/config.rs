use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::namespace::VariantRule;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub index: IndexConfig,
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    pub walker: WalkerConfig,
    #[serde(default)]
    pub namespace: NamespaceConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    /// Vector index name (created idempotently on `ddx init`).
    pub name: String,
    #[serde(default = "default_dims")]
    pub dims: usize,
    /// Metadata fields the index should keep filterable.
    #[serde(default = "default_indexed_fields")]
    pub indexed_fields: Vec<String>,
    /// Base namespace; variant rules append their suffixes to it.
    pub base_namespace: String,
}

fn default_dims() -> usize {
    1536
}
fn default_indexed_fields() -> Vec<String> {
    vec!["path".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// Chunks shorter than this are discarded as noise.
    #[serde(default = "default_min_chunk_len")]
    pub min_chunk_len: usize,
}

fn default_chunk_size() -> usize {
    2000
}
fn default_chunk_overlap() -> usize {
    100
}
fn default_min_chunk_len() -> usize {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum texts per embedding request; larger per-file chunk sets
    /// are split into sub-batches.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "text-embedding-ada-002".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct WalkerConfig {
    /// Root paths to ingest. Each is walked recursively.
    pub roots: Vec<PathBuf>,
    /// Whether to follow symbolic links during traversal. Off by
    /// default: a linked tree outside the roots is not ingested unless
    /// explicitly enabled.
    #[serde(default)]
    pub follow_symlinks: bool,
    /// Glob patterns excluded from traversal, relative to each root.
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    /// Number of files processed concurrently. Bounded to respect
    /// embedding-provider rate limits.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    8
}

#[derive(Debug, Deserialize, Clone)]
pub struct NamespaceConfig {
    /// Variant rules, tried in order; first matching path component wins.
    #[serde(default = "default_variant_rules")]
    pub rules: Vec<VariantRule>,
    /// Resolved namespace values that must never be ingested.
    #[serde(default)]
    pub excluded: Vec<String>,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            rules: default_variant_rules(),
            excluded: Vec::new(),
        }
    }
}

fn default_variant_rules() -> Vec<VariantRule> {
    vec![
        VariantRule {
            marker: "react".to_string(),
            suffix: "-react".to_string(),
        },
        VariantRule {
            marker: "lit".to_string(),
            suffix: "-lit".to_string(),
        },
    ]
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    /// Renderer executable invoked for markup sources.
    #[serde(default = "default_render_command")]
    pub command: String,
    /// `-a name=value` attributes passed through to the renderer
    /// (conditional-content flags, include roots).
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            command: default_render_command(),
            attributes: Vec::new(),
        }
    }
}

fn default_render_command() -> String {
    "asciidoctor".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }
    if config.chunking.chunk_overlap >= config.chunking.chunk_size {
        anyhow::bail!("chunking.chunk_overlap must be < chunking.chunk_size");
    }

    if config.index.dims == 0 {
        anyhow::bail!("index.dims must be > 0");
    }
    if config.index.base_namespace.is_empty() {
        anyhow::bail!("index.base_namespace must not be empty");
    }

    if config.walker.roots.is_empty() {
        anyhow::bail!("walker.roots must list at least one path");
    }
    if config.walker.concurrency == 0 {
        anyhow::bail!("walker.concurrency must be > 0");
    }

    if config.embedding.batch_size == 0 {
        anyhow::bail!("embedding.batch_size must be > 0");
    }
    match config.embedding.provider.as_str() {
        "openai" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be openai.",
            other
        ),
    }

    Ok(config)
}
