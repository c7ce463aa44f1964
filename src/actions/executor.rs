use crate::core::error::{Error, Result};
use crate::indexing::classifier::Assignment;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// What the executor does with each assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Report only; the filesystem is never touched
    Preview,
    /// Create target directories and move files
    Apply,
}

/// Result of executing one assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Preview mode: the move that would happen
    Planned,
    /// The file already lives in its target directory
    AlreadyInPlace,
    Moved { destination: PathBuf },
}

pub struct Executor {
    mode: Mode,
}

impl Executor {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn execute(&self, assignment: &Assignment) -> Result<Outcome> {
        match self.mode {
            Mode::Preview => Ok(Outcome::Planned),
            Mode::Apply => apply(assignment),
        }
    }
}

fn apply(assignment: &Assignment) -> Result<Outcome> {
    let source = &assignment.file_path;
    let target = &assignment.target_directory;

    let current_dir = source.parent().unwrap_or_else(|| Path::new(""));
    if same_directory(current_dir, target) {
        debug!(file = %source.display(), "Already in target directory");
        return Ok(Outcome::AlreadyInPlace);
    }

    let move_failed = |reason: String| Error::MoveFailed {
        path: source.clone(),
        target: target.clone(),
        reason,
    };

    let file_name = source
        .file_name()
        .ok_or_else(|| move_failed("source has no file name".to_string()))?;

    // Directory creation must finish before the move is attempted
    fs::create_dir_all(target).map_err(|e| move_failed(format!("cannot create directory: {}", e)))?;

    let destination = target.join(file_name);
    move_file(source, &destination).map_err(|e| move_failed(e.to_string()))?;

    debug!(from = %source.display(), to = %destination.display(), "Moved");
    Ok(Outcome::Moved { destination })
}

/// Rename, replacing any existing destination file. Only a rename across
/// filesystems falls back to copy and remove; every other failure leaves the
/// source and destination as they were.
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(err) if is_cross_device(&err) => {
            debug!(error = %err, "rename crosses filesystems, copying instead");
            copy_then_remove(source, destination)
        }
        Err(err) => Err(err),
    }
}

fn is_cross_device(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::CrossesDevices
}

/// Copy to `destination`, then remove `source`. If the source cannot be
/// removed the copy is deleted so the file exists in exactly one place.
fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    fs::copy(source, destination)?;
    if let Err(err) = fs::remove_file(source) {
        if let Err(cleanup) = fs::remove_file(destination) {
            warn!(
                destination = %destination.display(),
                error = %cleanup,
                "Could not remove copy after failed move"
            );
        }
        return Err(err);
    }
    Ok(())
}

/// Path-normalized equality: canonical when both paths exist, lexical otherwise
pub fn same_directory(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => normalize_lexically(&absolute(a)) == normalize_lexically(&absolute(b)),
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Resolve `.` and `..` without touching the filesystem
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
