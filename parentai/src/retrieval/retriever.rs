use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::cache::CorpusCache;
use super::chunker::DocumentChunker;
use super::corpus::Corpus;
use super::source::SourceDocument;
use crate::config::{ProcessingConfig, RetrievalConfig};
use crate::embeddings::{Embedder, QueryEmbeddingCache};
use crate::error::{ParentAiError, Result};
use crate::models::{ScoredChunk, TextChunk};

#[derive(Debug, Clone)]
pub struct RetrieverSettings {
    pub document_path: Option<PathBuf>,
    pub cache_path: PathBuf,
    pub processing: ProcessingConfig,
    pub max_chunks: usize,
    pub min_similarity: Option<f32>,
    pub query_cache_size: usize,
}

impl RetrieverSettings {
    pub fn from_config(retrieval: &RetrievalConfig, processing: &ProcessingConfig) -> Self {
        Self {
            document_path: retrieval.document_path.clone(),
            cache_path: retrieval.cache_path.clone(),
            processing: processing.clone(),
            max_chunks: retrieval.max_chunks,
            min_similarity: retrieval.min_similarity,
            query_cache_size: retrieval.query_cache_size,
        }
    }
}

/// What [`PassageRetriever::load_or_build`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The live corpus already matched the document.
    Unchanged { chunks: usize },
    /// The cache file matched and was loaded without embedding anything.
    Loaded { chunks: usize },
    /// The document was chunked and embedded, and the cache rewritten.
    Rebuilt { chunks: usize },
}

/// Nearest-neighbour lookup over an embedded reference document.
///
/// Readers take an `Arc` snapshot of the corpus and never block on a
/// rebuild. Rebuilds are serialised by `rebuild_lock`, built off to the side
/// and swapped in whole.
pub struct PassageRetriever {
    embedder: Arc<dyn Embedder>,
    settings: RetrieverSettings,
    corpus: RwLock<Arc<Corpus>>,
    rebuild_lock: Mutex<()>,
    query_cache: QueryEmbeddingCache,
}

impl PassageRetriever {
    pub fn new(embedder: Arc<dyn Embedder>, settings: RetrieverSettings) -> Self {
        let query_cache = QueryEmbeddingCache::new(settings.query_cache_size);
        Self {
            embedder,
            settings,
            corpus: RwLock::new(Arc::new(Corpus::empty())),
            rebuild_lock: Mutex::new(()),
            query_cache,
        }
    }

    /// A retriever over an already embedded corpus, with no backing document.
    pub fn from_corpus(
        embedder: Arc<dyn Embedder>,
        corpus: Corpus,
        max_chunks: usize,
        min_similarity: Option<f32>,
    ) -> Self {
        let settings = RetrieverSettings {
            document_path: None,
            cache_path: PathBuf::new(),
            processing: ProcessingConfig::default(),
            max_chunks,
            min_similarity,
            query_cache_size: 0,
        };
        let retriever = Self::new(embedder, settings);
        Self {
            corpus: RwLock::new(Arc::new(corpus)),
            ..retriever
        }
    }

    pub fn settings(&self) -> &RetrieverSettings {
        &self.settings
    }

    /// Current corpus snapshot.
    pub async fn corpus(&self) -> Arc<Corpus> {
        Arc::clone(&*self.corpus.read().await)
    }

    /// Makes the live corpus match the reference document.
    ///
    /// Unless `force` is set, an up-to-date live corpus is kept and a cache
    /// file with a matching fingerprint is loaded without embedding.
    /// Otherwise the document is re-chunked and re-embedded and the cache
    /// file rewritten atomically.
    pub async fn load_or_build(&self, force: bool) -> Result<BuildOutcome> {
        let document_path = self.settings.document_path.as_ref().ok_or_else(|| {
            ParentAiError::Retrieval("No reference document configured".to_string())
        })?;

        let _guard = self.rebuild_lock.lock().await;

        let document = SourceDocument::read(document_path).await?;
        let fingerprint = document.fingerprint(&self.settings.processing, self.embedder.model_id());

        if !force {
            let live = self.corpus().await;
            if live.fingerprint() == fingerprint {
                return Ok(BuildOutcome::Unchanged { chunks: live.len() });
            }

            if let Some(cache) = CorpusCache::load(&self.settings.cache_path).await? {
                if cache.fingerprint == fingerprint {
                    let corpus = cache.into_corpus();
                    let chunks = corpus.len();
                    tracing::info!(
                        chunks,
                        path = %self.settings.cache_path.display(),
                        "Loaded embedding cache"
                    );
                    self.swap(corpus).await;
                    return Ok(BuildOutcome::Loaded { chunks });
                }
                tracing::info!("Embedding cache is stale, rebuilding");
            }
        }

        let corpus = self.build(&document, fingerprint).await?;
        let chunks = corpus.len();

        CorpusCache::from_corpus(&corpus)
            .save(&self.settings.cache_path)
            .await?;
        tracing::info!(
            chunks,
            path = %self.settings.cache_path.display(),
            "Rebuilt embedding cache"
        );

        self.swap(corpus).await;
        Ok(BuildOutcome::Rebuilt { chunks })
    }

    async fn build(&self, document: &SourceDocument, fingerprint: String) -> Result<Corpus> {
        let text = document.text()?;
        let pieces = DocumentChunker::new(&self.settings.processing).chunk(&text);
        tracing::debug!(
            chunks = pieces.len(),
            document = %document.path.display(),
            "Embedding reference document"
        );

        let embeddings = self.embedder.embed(pieces.clone()).await?;
        if embeddings.len() != pieces.len() {
            return Err(ParentAiError::Embedding(format!(
                "Expected {} embeddings, got {}",
                pieces.len(),
                embeddings.len()
            )));
        }

        let chunks = pieces
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(index, (text, embedding))| TextChunk::new(index, text, embedding))
            .collect();

        Ok(Corpus::new(
            fingerprint,
            self.embedder.model_id().to_string(),
            chunks,
        ))
    }

    async fn swap(&self, corpus: Corpus) {
        let mut live = self.corpus.write().await;
        if live.model() != corpus.model() {
            self.query_cache.clear();
        }
        *live = Arc::new(corpus);
    }

    /// The most similar chunks for `question`, best first. Empty when the
    /// corpus is empty or nothing clears the similarity floor.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<ScoredChunk>> {
        let corpus = self.corpus().await;
        if corpus.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.embed_question(question).await?;
        if query.len() != corpus.dimensions() {
            tracing::warn!(
                query_dimensions = query.len(),
                corpus_dimensions = corpus.dimensions(),
                "Question embedding does not match corpus dimensions"
            );
        }

        let hits = corpus.top_n(&query, self.settings.max_chunks, self.settings.min_similarity);
        tracing::debug!(chunks = hits.len(), "Retrieved passages");
        Ok(hits)
    }

    async fn embed_question(&self, question: &str) -> Result<Vec<f32>> {
        let question = question.trim();
        let key = self.query_cache.generate_key(question);
        if let Some(cached) = self.query_cache.get(&key) {
            return Ok(cached);
        }

        let embedding = self.embedder.embed_query(question).await?;
        self.query_cache.put(key, embedding.clone());
        Ok(embedding)
    }
}
