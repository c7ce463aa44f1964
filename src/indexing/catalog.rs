use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::indexing::discovery::resolve_root;
use ignore::{DirEntry, WalkBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A candidate target directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub path: PathBuf,
    /// Bare directory name, never the full path
    pub label: String,
}

/// Walker shared by catalog building and file discovery.
///
/// Gitignore handling is off so the walk sees the tree as it is on disk, and
/// children are visited in file-name order so the result is stable for a fixed
/// filesystem state. Directories named in `exclude_dirs` are pruned before
/// descending; dot-prefixed entries are skipped only when `skip_hidden` is set.
pub(crate) fn walk_builder(root: &Path, config: &Config, skip_hidden: bool) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .hidden(skip_hidden)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    let exclude_dirs = config.exclude_dirs.clone();
    builder.filter_entry(move |entry| entry.depth() == 0 || !is_excluded_dir(entry, &exclude_dirs));
    builder
}

fn is_excluded_dir(entry: &DirEntry, exclude_dirs: &std::collections::BTreeSet<String>) -> bool {
    is_directory(entry)
        && entry
            .file_name()
            .to_str()
            .map(|name| exclude_dirs.contains(name))
            .unwrap_or(false)
}

/// A real directory, or a symlink that resolves to one. Symlinked directories
/// are candidates but are never descended into.
fn is_directory(entry: &DirEntry) -> bool {
    match entry.file_type() {
        Some(ft) if ft.is_dir() => true,
        Some(ft) if ft.is_symlink() => entry.path().is_dir(),
        _ => false,
    }
}

/// Collect every non-excluded subdirectory of `root`, in traversal order.
///
/// Hidden directories are catalogued like any other; only `exclude_dirs`
/// prunes. The root itself is never a candidate. Fails with [`Error::EmptyCatalog`]
/// when nothing remains after exclusion.
pub fn build_catalog(root: &Path, config: &Config) -> Result<Vec<DirectoryEntry>> {
    let root = resolve_root(root)?;
    let mut catalog = Vec::new();

    for result in walk_builder(&root, config, false).build() {
        match result {
            Ok(entry) => {
                if entry.depth() == 0 || !is_directory(&entry) {
                    continue;
                }
                let label = entry.file_name().to_string_lossy().into_owned();
                debug!(label = %label, path = %entry.path().display(), "catalog entry");
                catalog.push(DirectoryEntry {
                    path: entry.into_path(),
                    label,
                });
            }
            Err(err) => {
                warn!("Failed to access directory entry: {}", err);
            }
        }
    }

    if catalog.is_empty() {
        return Err(Error::EmptyCatalog(root));
    }
    Ok(catalog)
}

/// Labels in catalog order; index `i` names `catalog[i]`
pub fn labels(catalog: &[DirectoryEntry]) -> Vec<String> {
    catalog.iter().map(|entry| entry.label.clone()).collect()
}
