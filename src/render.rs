//! Markup renderer collaborator.
//!
//! Markup sources are rendered to HTML by an external renderer before
//! the plain-text conversion. The renderer must resolve include
//! directives and conditional attributes; any failure propagates as a
//! single extraction failure for that file.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::config::RenderConfig;

/// Per-file rendering options.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Directory includes are resolved relative to (the source file's
    /// parent directory).
    pub base_dir: PathBuf,
    /// `name=value` attributes passed through to the renderer:
    /// conditional-content flags and include roots.
    pub attributes: Vec<String>,
}

/// Renders markup source text to HTML.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, source: &str, opts: &RenderOptions) -> Result<String>;
}

/// Renderer that shells out to `asciidoctor`, feeding the source on
/// stdin and reading the rendered HTML from stdout.
pub struct AsciidoctorRenderer {
    command: String,
}

impl AsciidoctorRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            command: config.command.clone(),
        }
    }
}

#[async_trait]
impl Renderer for AsciidoctorRenderer {
    async fn render(&self, source: &str, opts: &RenderOptions) -> Result<String> {
        let mut cmd = tokio::process::Command::new(&self.command);
        cmd.arg("--backend")
            .arg("html5")
            .arg("--safe-mode")
            .arg("unsafe")
            .arg("--base-dir")
            .arg(&opts.base_dir)
            .arg("-o")
            .arg("-");
        for attr in &opts.attributes {
            cmd.arg("-a").arg(attr);
        }
        cmd.arg("-");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn renderer '{}'", self.command))?;

        let mut stdin = child.stdin.take().expect("stdin was piped");
        stdin.write_all(source.as_bytes()).await?;
        drop(stdin);

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Renderer '{}' exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
