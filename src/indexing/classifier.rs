use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::indexing::catalog::{labels, DirectoryEntry};
use crate::indexing::discovery::DiscoveredFile;
use crate::search::matcher::best_match;
use crate::search::provider::{Embedding, EmbeddingProvider};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Decision to place one file in one catalog directory
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub file_path: PathBuf,
    pub target_directory: PathBuf,
    /// Label of the winning directory
    pub label: String,
    pub similarity: f32,
}

/// Matches files against a catalog whose labels were embedded once up front
pub struct Classifier<'a, P: EmbeddingProvider + ?Sized> {
    provider: &'a P,
    catalog: &'a [DirectoryEntry],
    label_embeddings: Vec<Embedding>,
    document_prefix: String,
}

impl<'a, P: EmbeddingProvider + ?Sized> Classifier<'a, P> {
    /// Batch-embed every catalog label
    pub fn new(provider: &'a P, catalog: &'a [DirectoryEntry], config: &Config) -> Result<Self> {
        if catalog.is_empty() {
            return Err(Error::EmptyCandidateSet);
        }

        let texts: Vec<String> = labels(catalog)
            .into_iter()
            .map(|label| format!("{}{}", config.label_prefix, label))
            .collect();
        let label_embeddings = provider.embed_many(&texts)?;

        if label_embeddings.len() != catalog.len() {
            return Err(Error::ProviderUnavailable(format!(
                "Provider returned {} embeddings for {} labels",
                label_embeddings.len(),
                catalog.len()
            )));
        }
        debug!(labels = catalog.len(), "Embedded directory labels");

        Ok(Self {
            provider,
            catalog,
            label_embeddings,
            document_prefix: config.document_prefix.clone(),
        })
    }

    /// Read, embed and match a single file
    pub fn classify_file(&self, file: &DiscoveredFile) -> Result<Assignment> {
        let text = read_text(&file.path)?;
        let query = self
            .provider
            .embed_one(&format!("{}{}", self.document_prefix, text))?;
        let found = best_match(&query, &self.label_embeddings)?;
        let entry = &self.catalog[found.index];

        debug!(
            file = %file.relative_path.display(),
            label = %entry.label,
            similarity = found.similarity,
            "Classified"
        );

        Ok(Assignment {
            file_path: file.path.clone(),
            target_directory: entry.path.clone(),
            label: entry.label.clone(),
            similarity: found.similarity,
        })
    }

    /// Lazily classify `files` in order. A failed file yields an `Err` item
    /// and the iterator moves on to the next one.
    pub fn classify<'b>(
        &'b self,
        files: &'b [DiscoveredFile],
    ) -> impl Iterator<Item = Result<Assignment>> + 'b {
        files.iter().map(move |file| self.classify_file(file))
    }

    /// Classify across the rayon pool. Results come back in `files` order
    /// and match what [`Classifier::classify`] would produce.
    pub fn classify_parallel(&self, files: &[DiscoveredFile]) -> Vec<Result<Assignment>> {
        files.par_iter().map(|file| self.classify_file(file)).collect()
    }
}

/// Read a file as UTF-8 text
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| Error::UnreadableFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| Error::UnreadableFile {
        path: path.to_path_buf(),
        reason: format!("invalid UTF-8: {}", e.utf8_error()),
    })
}
