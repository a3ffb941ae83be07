use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex};

use super::Embedder;
use crate::error::{ParentAiError, Result};

/// In-process ONNX embedding model.
#[derive(Clone)]
pub struct LocalEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
    batch_size: usize,
    model_id: String,
}

impl LocalEmbedder {
    pub fn new(model_name: &str, batch_size: usize) -> Result<Self> {
        let embedding_model = resolve_embedding_model(model_name);
        let model = TextEmbedding::try_new(
            InitOptions::new(embedding_model).with_show_download_progress(true),
        )
        .map_err(|e| ParentAiError::Embedding(e.to_string()))?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            batch_size: batch_size.max(1),
            model_id: format!("local#{model_name}"),
        })
    }

    async fn run(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let model = Arc::clone(&self.model);
        let batch_size = self.batch_size;
        tokio::task::spawn_blocking(move || {
            let mut model = model.lock().map_err(|e| {
                ParentAiError::Embedding(format!("Embedding model lock poisoned: {e}"))
            })?;
            model
                .embed(texts, Some(batch_size))
                .map_err(|e| ParentAiError::Embedding(e.to_string()))
        })
        .await
        .map_err(|e| ParentAiError::Embedding(format!("Embedding worker failed: {e}")))?
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        // Local models use passage: prefix
        let prefixed = texts.into_iter().map(|t| format!("passage: {t}")).collect();
        self.run(prefixed).await
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let embeddings = self.run(vec![format!("query: {query}")]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ParentAiError::Embedding("No embedding generated".to_string()))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

fn resolve_embedding_model(model_name: &str) -> EmbeddingModel {
    match model_name {
        "BAAI/bge-small-en-v1.5" | "bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
        "BAAI/bge-base-en-v1.5" | "bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
        "all-MiniLM-L6-v2" | "sentence-transformers/all-MiniLM-L6-v2" => {
            EmbeddingModel::AllMiniLML6V2
        }
        "multilingual-e5-small" | "intfloat/multilingual-e5-small" => {
            EmbeddingModel::MultilingualE5Small
        }
        "multilingual-e5-base" | "intfloat/multilingual-e5-base" => {
            EmbeddingModel::MultilingualE5Base
        }
        _ => EmbeddingModel::MultilingualE5Small,
    }
}
