//! Table-driven namespace resolution.
//!
//! Maps a file path to the vector-index namespace its records belong
//! in. Documentation variants (e.g. the React and Lit flavors of the
//! same article tree) live in sibling directories; a variant marker in
//! the path appends a suffix to the base namespace. New variants are
//! added by extending the rule table in config, not by touching the
//! walker or the pipeline.

use std::path::Path;

use serde::Deserialize;

/// One variant rule: a path component to look for and the namespace
/// suffix it implies.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantRule {
    /// Path component identifying the variant (e.g. `react`).
    pub marker: String,
    /// Suffix appended to the base namespace (e.g. `-react`).
    pub suffix: String,
}

/// Resolves (base namespace, path) to the namespace a file's records
/// are upserted under, or signals that the file must be skipped.
#[derive(Debug, Clone)]
pub struct NamespaceResolver {
    base: String,
    rules: Vec<VariantRule>,
    excluded: Vec<String>,
}

impl NamespaceResolver {
    pub fn new(base: String, rules: Vec<VariantRule>, excluded: Vec<String>) -> Self {
        Self {
            base,
            rules,
            excluded,
        }
    }

    /// Resolve the namespace for `path`. Pure: the same path always
    /// yields the same result. Returns `None` when the resolved value
    /// is excluded (e.g. an umbrella landing page that must not be
    /// indexed under the bare base namespace).
    pub fn resolve(&self, path: &Path) -> Option<String> {
        let mut namespace = self.base.clone();
        for rule in &self.rules {
            let hit = path
                .components()
                .any(|c| c.as_os_str().to_string_lossy() == rule.marker);
            if hit {
                namespace.push_str(&rule.suffix);
                break;
            }
        }

        if self.excluded.iter().any(|e| e == &namespace) {
            return None;
        }
        Some(namespace)
    }
}
