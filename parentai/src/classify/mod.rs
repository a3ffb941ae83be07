//! Deterministic question classification: age band and topic.

mod age;
mod topic;

pub use age::AgeGrouper;
pub use topic::{KeywordTable, TopicClassifier, TopicKeywords};
