use crate::models::{ScoredChunk, TextChunk};

/// An embedded reference document. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    fingerprint: String,
    model: String,
    dimensions: usize,
    chunks: Vec<TextChunk>,
}

impl Corpus {
    pub fn new(fingerprint: String, model: String, chunks: Vec<TextChunk>) -> Self {
        let dimensions = chunks.first().map(|c| c.embedding.len()).unwrap_or(0);
        Self {
            fingerprint,
            model,
            dimensions,
            chunks,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn chunks(&self) -> &[TextChunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The `limit` chunks most similar to `query`, best first.
    ///
    /// Chunks whose vector length differs from the query are skipped, as are
    /// chunks scoring below `min_similarity`. Equal scores keep chunk order.
    pub fn top_n(&self, query: &[f32], limit: usize, min_similarity: Option<f32>) -> Vec<ScoredChunk> {
        if limit == 0 {
            return Vec::new();
        }

        let floor = min_similarity.map(f64::from);
        let mut hits: Vec<(f64, &TextChunk)> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                let score = cosine_similarity(query, &chunk.embedding)?;
                match floor {
                    Some(floor) if score < floor => None,
                    _ => Some((score, chunk)),
                }
            })
            .collect();

        hits.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.index.cmp(&b.1.index))
        });
        hits.truncate(limit);

        hits.into_iter()
            .map(|(score, chunk)| ScoredChunk {
                index: chunk.index,
                text: chunk.text.clone(),
                score: score as f32,
            })
            .collect()
    }
}

/// Cosine similarity accumulated in `f64`. `None` for mismatched lengths,
/// empty vectors or a zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let x64 = f64::from(x);
        let y64 = f64::from(y);
        dot += x64 * y64;
        norm_a += x64 * x64;
        norm_b += y64 * y64;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return None;
    }
    Some(dot / denom)
}
