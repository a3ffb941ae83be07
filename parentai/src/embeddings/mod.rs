mod api;
mod cache;
#[cfg(feature = "local-embeddings")]
mod local;
mod provider;

#[cfg(test)]
mod tests;

use async_trait::async_trait;

use crate::error::{ParentAiError, Result};

pub use api::{default_base_url, ApiConfig, EmbeddingApiClient};
pub use cache::QueryEmbeddingCache;
#[cfg(feature = "local-embeddings")]
pub use local::LocalEmbedder;
pub use provider::build_embedder;

/// Turns text into fixed-length vectors.
///
/// The corpus and the questions must be embedded by the same model; the
/// retriever uses [`Embedder::model_id`] to detect a change of model.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds reference-document passages, one vector per input, in order.
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Embeds a single question.
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.embed(vec![query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ParentAiError::Embedding("No embedding generated".to_string()))
    }

    /// Identifies the model and endpoint, recorded in the corpus fingerprint.
    fn model_id(&self) -> &str;
}
