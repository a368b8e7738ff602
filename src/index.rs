//! Vector index abstraction and implementations.
//!
//! [`VectorIndex`] is the pipeline's only view of the storage side:
//! idempotent index creation plus namespaced batch upserts. The
//! production implementation targets the Pinecone REST API; the
//! in-memory implementation backs tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use crate::config::IndexConfig;
use crate::models::IndexRecord;

/// Namespaced vector storage.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create the index if it does not exist yet. No-op when present.
    async fn ensure_index(&self, name: &str, dims: usize, indexed_fields: &[String])
        -> Result<()>;

    /// Upsert a batch of records under `namespace`. One call per file;
    /// the caller never splits a file's records across calls.
    async fn upsert(&self, records: &[IndexRecord], namespace: &str) -> Result<()>;
}

/// Pinecone-backed index. Requires `PINECONE_API_KEY` and
/// `PINECONE_ENVIRONMENT` in the environment; the index name comes
/// from config.
pub struct PineconeIndex {
    client: reqwest::Client,
    api_key: String,
    environment: String,
    index_name: String,
    /// Project id resolved from the controller; part of the data-plane
    /// hostname.
    project_id: String,
}

impl PineconeIndex {
    /// Connect to the controller and resolve the project id used in
    /// data-plane hostnames.
    pub async fn connect(config: &IndexConfig, timeout_secs: u64) -> Result<Self> {
        let api_key = std::env::var("PINECONE_API_KEY")
            .map_err(|_| anyhow::anyhow!("PINECONE_API_KEY environment variable not set"))?;
        let environment = std::env::var("PINECONE_ENVIRONMENT")
            .map_err(|_| anyhow::anyhow!("PINECONE_ENVIRONMENT environment variable not set"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        let whoami_url = format!("https://controller.{}.pinecone.io/actions/whoami", environment);
        let resp = client
            .get(&whoami_url)
            .header("Api-Key", &api_key)
            .send()
            .await
            .with_context(|| "Failed to reach Pinecone controller")?;
        if !resp.status().is_success() {
            bail!("Pinecone whoami failed with {}", resp.status());
        }
        let whoami: serde_json::Value = resp.json().await?;
        let project_id = whoami
            .get("project_name")
            .and_then(|p| p.as_str())
            .ok_or_else(|| anyhow::anyhow!("Pinecone whoami response missing project_name"))?
            .to_string();

        Ok(Self {
            client,
            api_key,
            environment,
            index_name: config.name.clone(),
            project_id,
        })
    }

    fn controller_url(&self, path: &str) -> String {
        format!("https://controller.{}.pinecone.io{}", self.environment, path)
    }

    fn data_url(&self, path: &str) -> String {
        format!(
            "https://{}-{}.svc.{}.pinecone.io{}",
            self.index_name, self.project_id, self.environment, path
        )
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn ensure_index(
        &self,
        name: &str,
        dims: usize,
        indexed_fields: &[String],
    ) -> Result<()> {
        let resp = self
            .client
            .get(self.controller_url("/databases"))
            .header("Api-Key", &self.api_key)
            .send()
            .await?;
        if !resp.status().is_success() {
            bail!("Pinecone list indexes failed with {}", resp.status());
        }
        let existing: Vec<String> = resp.json().await?;
        if existing.iter().any(|n| n == name) {
            return Ok(());
        }

        tracing::info!(index = name, dims, "creating vector index");
        let body = serde_json::json!({
            "name": name,
            "dimension": dims,
            "metadata_config": { "indexed": indexed_fields },
        });
        let resp = self
            .client
            .post(self.controller_url("/databases"))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        // 409 means another run created it first; that is fine.
        if !status.is_success() && status.as_u16() != 409 {
            let text = resp.text().await.unwrap_or_default();
            bail!("Pinecone create index failed with {}: {}", status, text);
        }
        Ok(())
    }

    async fn upsert(&self, records: &[IndexRecord], namespace: &str) -> Result<()> {
        let body = serde_json::json!({
            "vectors": records,
            "namespace": namespace,
        });
        let resp = self
            .client
            .post(self.data_url("/vectors/upsert"))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("Pinecone upsert failed with {}: {}", status, text);
        }
        Ok(())
    }
}

/// In-memory index for tests: records grouped per namespace behind an
/// `RwLock`, with call counters for asserting pipeline behavior.
#[derive(Default)]
pub struct MemoryIndex {
    namespaces: RwLock<HashMap<String, Vec<IndexRecord>>>,
    ensure_calls: AtomicUsize,
    upsert_calls: AtomicUsize,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records upserted under `namespace`, in upsert order.
    pub fn records_in(&self, namespace: &str) -> Vec<IndexRecord> {
        self.namespaces
            .read()
            .unwrap()
            .get(namespace)
            .cloned()
            .unwrap_or_default()
    }

    /// All namespaces that received at least one record.
    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.namespaces.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn ensure_calls(&self) -> usize {
        self.ensure_calls.load(Ordering::SeqCst)
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn ensure_index(
        &self,
        _name: &str,
        _dims: usize,
        _indexed_fields: &[String],
    ) -> Result<()> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn upsert(&self, records: &[IndexRecord], namespace: &str) -> Result<()> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.namespaces
            .write()
            .unwrap()
            .entry(namespace.to_string())
            .or_default()
            .extend_from_slice(records);
        Ok(())
    }
}
