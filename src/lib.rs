// Core functionality
pub mod core {
    pub mod config;
    pub mod error;
}

// Directory catalog, file discovery and classification
pub mod indexing {
    pub mod catalog;
    pub mod classifier;
    pub mod discovery;
}

// Embeddings & similarity
pub mod search {
    pub mod matcher;
    pub mod model;
    pub mod provider;
}

// Preview / apply
pub mod actions {
    pub mod executor;
}

pub mod pipeline;

// User interfaces
pub mod ui {
    pub mod cli;
}

// Re-export commonly used types
pub use actions::executor::{Executor, Mode, Outcome};
pub use core::config::Config;
pub use core::error::{Error, Result};
pub use indexing::catalog::{build_catalog, DirectoryEntry};
pub use indexing::classifier::{Assignment, Classifier};
pub use indexing::discovery::{discover_files, DiscoveredFile};
pub use pipeline::{run, RunOptions, RunSummary};
pub use search::matcher::{best_match, cosine_similarity, Match};
pub use search::model::EmbeddingModel;
pub use search::provider::{Embedding, EmbeddingProvider};
pub use ui::cli::Cli;
