//! Passage retrieval over an embedded reference document.

mod cache;
mod chunker;
mod corpus;
mod retriever;
mod source;

pub use cache::{CorpusCache, CACHE_VERSION};
pub use chunker::DocumentChunker;
pub use corpus::{cosine_similarity, Corpus};
pub use retriever::{BuildOutcome, PassageRetriever, RetrieverSettings};
pub use source::{fingerprint, DocumentFormat, SourceDocument};
