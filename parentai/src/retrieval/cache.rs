use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::Corpus;
use crate::error::{ParentAiError, Result};
use crate::models::TextChunk;

pub const CACHE_VERSION: u32 = 1;

/// On-disk form of a [`Corpus`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusCache {
    pub version: u32,
    pub fingerprint: String,
    pub model: String,
    pub dimensions: usize,
    pub created_at: DateTime<Utc>,
    pub chunks: Vec<TextChunk>,
}

impl CorpusCache {
    pub fn from_corpus(corpus: &Corpus) -> Self {
        Self {
            version: CACHE_VERSION,
            fingerprint: corpus.fingerprint().to_string(),
            model: corpus.model().to_string(),
            dimensions: corpus.dimensions(),
            created_at: Utc::now(),
            chunks: corpus.chunks().to_vec(),
        }
    }

    pub fn into_corpus(self) -> Corpus {
        Corpus::new(self.fingerprint, self.model, self.chunks)
    }

    /// Reads the cache file. A missing file is `Ok(None)`; an unreadable or
    /// outdated one is `Ok(None)` with a warning, so the caller rebuilds.
    pub async fn load(path: &Path) -> Result<Option<Self>> {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let cache: CorpusCache = match serde_json::from_slice(&raw) {
            Ok(cache) => cache,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable embedding cache");
                return Ok(None);
            }
        };

        if cache.version != CACHE_VERSION {
            tracing::warn!(
                path = %path.display(),
                version = cache.version,
                "Ignoring embedding cache with unsupported version"
            );
            return Ok(None);
        }

        if let Some(chunk) = cache
            .chunks
            .iter()
            .find(|c| c.embedding.len() != cache.dimensions)
        {
            tracing::warn!(
                path = %path.display(),
                chunk = chunk.index,
                "Ignoring embedding cache with inconsistent dimensions"
            );
            return Ok(None);
        }

        Ok(Some(cache))
    }

    /// Writes to a sibling temp file and renames it over `path`, so a reader
    /// never sees a partially written cache.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, json).await.map_err(|e| {
            ParentAiError::Retrieval(format!("Failed to write {}: {e}", temp_path.display()))
        })?;
        tokio::fs::rename(&temp_path, path).await.map_err(|e| {
            ParentAiError::Retrieval(format!("Failed to rename to {}: {e}", path.display()))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Corpus {
        Corpus::new(
            "abc".to_string(),
            "test#model".to_string(),
            vec![
                TextChunk::new(0, "first", vec![1.0, 0.0]),
                TextChunk::new(1, "second", vec![0.0, 1.0]),
            ],
        )
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("book_embeddings.json");

        CorpusCache::from_corpus(&corpus()).save(&path).await.unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = CorpusCache::load(&path).await.unwrap().unwrap();
        assert_eq!(loaded.fingerprint, "abc");
        assert_eq!(loaded.dimensions, 2);
        assert_eq!(loaded.into_corpus().chunks(), corpus().chunks());
    }

    #[tokio::test]
    async fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = CorpusCache::load(&dir.path().join("absent.json")).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn corrupt_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(CorpusCache::load(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn inconsistent_dimensions_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let mut cache = CorpusCache::from_corpus(&corpus());
        cache.chunks[1].embedding.push(0.5);
        cache.save(&path).await.unwrap();

        assert!(CorpusCache::load(&path).await.unwrap().is_none());
    }
}
