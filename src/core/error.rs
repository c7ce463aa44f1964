use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Embedding provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("No subdirectories found under {}", .0.display())]
    EmptyCatalog(PathBuf),

    #[error("No eligible files found under {}", .0.display())]
    EmptyFileSet(PathBuf),

    #[error("Cannot read {}: {reason}", .path.display())]
    UnreadableFile { path: PathBuf, reason: String },

    #[error("Cannot move {} into {}: {reason}", .path.display(), .target.display())]
    MoveFailed {
        path: PathBuf,
        target: PathBuf,
        reason: String,
    },

    #[error("No candidate embeddings to match against")]
    EmptyCandidateSet,

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("HuggingFace API error: {0}")]
    HuggingFace(#[from] hf_hub::api::sync::ApiError),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),
}

impl Error {
    /// Empty catalog / empty file set: reported, but the run ends successfully.
    pub fn is_clean_exit(&self) -> bool {
        matches!(self, Error::EmptyCatalog(_) | Error::EmptyFileSet(_))
    }

    /// Errors scoped to a single file or assignment. The run continues past them.
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            Error::UnreadableFile { .. }
                | Error::MoveFailed { .. }
                | Error::DimensionMismatch { .. }
                | Error::EmptyCandidateSet
        )
    }

    pub fn is_fatal(&self) -> bool {
        !self.is_clean_exit() && !self.is_per_item()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
