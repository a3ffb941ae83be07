use std::sync::Arc;

use super::api::{default_base_url, ApiConfig, EmbeddingApiClient};
use super::Embedder;
use crate::config::{parse_provider_model, EmbeddingsConfig};
use crate::error::{ParentAiError, Result};

/// Builds the embedder selected by `EMBEDDING_MODEL`.
///
/// `provider/model` names go to the matching OpenAI-compatible endpoint;
/// bare names (provider `local`) load an in-process model when the
/// `local-embeddings` feature is enabled.
pub fn build_embedder(config: &EmbeddingsConfig) -> Result<Arc<dyn Embedder>> {
    let (provider, model_name) = parse_provider_model(&config.model);

    if provider == "local" {
        return build_local(model_name, config.batch_size);
    }

    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| default_base_url(provider).to_string());

    tracing::info!(provider, model = model_name, %base_url, "Using API embeddings");

    let client = EmbeddingApiClient::new(ApiConfig {
        base_url,
        api_key: config.api_key.clone(),
        model: model_name.to_string(),
        timeout_secs: config.timeout_secs,
        max_retries: config.max_retries,
        batch_size: config.batch_size,
    })?;

    Ok(Arc::new(client))
}

#[cfg(feature = "local-embeddings")]
fn build_local(model_name: &str, batch_size: usize) -> Result<Arc<dyn Embedder>> {
    tracing::info!(model = model_name, "Loading local embedding model");
    Ok(Arc::new(super::local::LocalEmbedder::new(
        model_name, batch_size,
    )?))
}

#[cfg(not(feature = "local-embeddings"))]
fn build_local(model_name: &str, _batch_size: usize) -> Result<Arc<dyn Embedder>> {
    Err(ParentAiError::Config(format!(
        "Embedding model '{model_name}' needs the local-embeddings feature; \
         use a provider prefix such as openai/ instead"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(model: &str) -> EmbeddingsConfig {
        EmbeddingsConfig {
            model: model.to_string(),
            api_key: Some("key".to_string()),
            base_url: None,
            timeout_secs: 5,
            max_retries: 0,
            batch_size: 8,
        }
    }

    #[test]
    fn api_provider_model_id_includes_endpoint() {
        let embedder = build_embedder(&config("openai/text-embedding-3-small")).unwrap();
        assert_eq!(
            embedder.model_id(),
            "https://api.openai.com/v1#text-embedding-3-small"
        );
    }

    #[test]
    fn base_url_override_changes_model_id() {
        let mut cfg = config("ollama/nomic-embed-text");
        cfg.base_url = Some("http://gpu-box:11434/v1/".to_string());
        let embedder = build_embedder(&cfg).unwrap();
        assert_eq!(embedder.model_id(), "http://gpu-box:11434/v1#nomic-embed-text");
    }

    #[cfg(not(feature = "local-embeddings"))]
    #[test]
    fn bare_model_needs_local_feature() {
        let result = build_embedder(&config("bge-small-en-v1.5"));
        assert!(matches!(result, Err(ParentAiError::Config(_))));
    }
}
