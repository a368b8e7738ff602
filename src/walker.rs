//! Tree traversal and eligibility filtering.
//!
//! One generic walk over the configured roots produces the list of
//! files the pipeline will process; extraction policy stays out of
//! traversal policy. Entries named with a leading `_` or `.` are
//! private by convention (AsciiDoc partials, hidden files) and are
//! pruned together with their subtrees. Files with an unrecognized
//! extension are skipped with an informational log, never an error.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::models::DocumentKind;

/// Recursively enumerate every eligible file under `roots`, sorted for
/// deterministic ordering. Unreadable subtrees are logged and skipped;
/// remaining roots continue. Symlinks are followed only when
/// `follow_symlinks` is set.
pub fn discover(
    roots: &[PathBuf],
    follow_symlinks: bool,
    exclude_globs: &[String],
) -> Result<Vec<PathBuf>> {
    let exclude_set = build_globset(exclude_globs)?;
    let mut files = Vec::new();

    for root in roots {
        if !root.exists() {
            warn!(root = %root.display(), "root path does not exist, skipping");
            continue;
        }

        let walker = WalkDir::new(root)
            .follow_links(follow_symlinks)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_sentinel_name(e.file_name()));

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "traversal error, skipping subtree");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(path);
            if exclude_set.is_match(relative) {
                continue;
            }

            match detect_kind(path) {
                Some(_) => files.push(path.to_path_buf()),
                None => {
                    info!(path = %path.display(), "unsupported file type, skipping");
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Detect the document format from the file extension.
pub fn detect_kind(path: &Path) -> Option<DocumentKind> {
    let ext = path.extension()?.to_str()?;
    DocumentKind::from_extension(&ext.to_ascii_lowercase())
}

fn is_sentinel_name(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('_') || name.starts_with('.')
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
