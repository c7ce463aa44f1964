use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::indexing::catalog::walk_builder;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// A file eligible for classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub relative_path: PathBuf,
}

/// Check that `root` is an existing directory and return its absolute form
pub fn resolve_root(root: &Path) -> Result<PathBuf> {
    if !root.exists() {
        return Err(Error::Config(format!(
            "Directory does not exist: {}",
            root.display()
        )));
    }

    if !root.is_dir() {
        return Err(Error::Config(format!(
            "Path is not a directory: {}",
            root.display()
        )));
    }

    Ok(std::fs::canonicalize(root)?)
}

/// Discover every file under `root` with an included extension and no
/// excluded directory between `root` and the file.
///
/// Dot-prefixed files and directories are skipped unless `include_hidden`
/// is set. The list is fixed at call time; files created afterwards are not
/// seen.
pub fn discover_files(root: &Path, config: &Config) -> Result<Vec<DiscoveredFile>> {
    let root = resolve_root(root)?;
    let mut files = Vec::new();

    for result in walk_builder(&root, config, !config.include_hidden).build() {
        match result {
            Ok(entry) => {
                if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                    continue;
                }

                let path = entry.path();
                if !config.is_included_extension(path) {
                    continue;
                }

                let relative_path = path
                    .strip_prefix(&root)
                    .map_err(|e| {
                        Error::Io(std::io::Error::new(
                            std::io::ErrorKind::Other,
                            format!("Failed to get relative path: {}", e),
                        ))
                    })?
                    .to_path_buf();

                // Independent of walker pruning: both must agree
                if has_excluded_component(&relative_path, config) {
                    continue;
                }

                files.push(DiscoveredFile {
                    path: path.to_path_buf(),
                    relative_path,
                });
            }
            Err(err) => {
                // Log but continue - some files might be inaccessible
                warn!("Failed to access file: {}", err);
            }
        }
    }

    if files.is_empty() {
        return Err(Error::EmptyFileSet(root));
    }
    Ok(files)
}

/// Whether any directory segment of a root-relative path is excluded
pub fn has_excluded_component(relative_path: &Path, config: &Config) -> bool {
    let parent = relative_path.parent().unwrap_or_else(|| Path::new(""));
    parent.components().any(|component| match component {
        Component::Normal(name) => name.to_str().map(|n| config.is_excluded_name(n)).unwrap_or(false),
        _ => false,
    })
}
