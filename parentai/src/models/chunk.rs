use serde::{Deserialize, Serialize};

/// A span of the reference document with its precomputed embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    pub index: usize,
    pub text: String,
    pub embedding: Vec<f32>,
}

impl TextChunk {
    pub fn new(index: usize, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            index,
            text: text.into(),
            embedding,
        }
    }
}

/// A retrieved chunk and its similarity to the question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub index: usize,
    pub text: String,
    pub score: f32,
}
