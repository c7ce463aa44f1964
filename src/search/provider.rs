use crate::core::error::{Error, Result};

/// A fixed-length embedding vector
pub type Embedding = Vec<f32>;

/// Maps text to embeddings.
///
/// Implementations are loaded once per run and shared read-only, so they must
/// be safe to call from several threads at once.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts; output order and length match the input.
    fn embed_many(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Embed a single text
    fn embed_one(&self, text: &str) -> Result<Embedding> {
        self.embed_many(&[text.to_string()])?
            .pop()
            .ok_or_else(|| Error::ProviderUnavailable("Provider returned no embedding".to_string()))
    }
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for &P {
    fn embed_many(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        (**self).embed_many(texts)
    }

    fn embed_one(&self, text: &str) -> Result<Embedding> {
        (**self).embed_one(text)
    }
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Box<P> {
    fn embed_many(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        (**self).embed_many(texts)
    }

    fn embed_one(&self, text: &str) -> Result<Embedding> {
        (**self).embed_one(text)
    }
}
