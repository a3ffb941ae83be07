use std::path::Path;

use serde::Deserialize;

use crate::error::{ParentAiError, Result};
use crate::models::Topic;

const DEFAULT_KEYWORDS: &str = include_str!("../../data/topic_keywords.json");

/// Ordered keyword lists for each topic, as authored in the keyword file.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordTable {
    pub version: u32,
    pub default_topic: Topic,
    pub topics: Vec<TopicKeywords>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicKeywords {
    pub topic: Topic,
    pub keywords: Vec<String>,
}

impl KeywordTable {
    /// The table shipped with the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_json(DEFAULT_KEYWORDS)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let table: KeywordTable = serde_json::from_str(raw)
            .map_err(|e| ParentAiError::Knowledge(format!("Invalid topic keyword table: {e}")))?;
        table.validate()?;
        Ok(table)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    fn validate(&self) -> Result<()> {
        if let Some(entry) = self
            .topics
            .iter()
            .find(|entry| entry.keywords.iter().any(|k| k.trim().is_empty()))
        {
            return Err(ParentAiError::Knowledge(format!(
                "Empty keyword in topic {}",
                entry.topic
            )));
        }
        Ok(())
    }
}

/// Assigns a [`Topic`] to a question by keyword containment.
///
/// The question is lowercased and topics are tested in the table's declared
/// order; the first topic with any keyword occurring as a substring wins.
/// There is no scoring: a question mentioning vocabulary from several topics
/// always resolves to the one declared first, even when a later topic has
/// more hits. Overlapping vocabulary in the table (e.g. "воспитание" under
/// both discipline and parenting philosophy) is therefore only reachable
/// through its first occurrence.
#[derive(Debug, Clone)]
pub struct TopicClassifier {
    entries: Vec<(Topic, Vec<String>)>,
    default_topic: Topic,
}

impl TopicClassifier {
    pub fn new(table: KeywordTable) -> Self {
        let entries = table
            .topics
            .into_iter()
            .map(|entry| {
                let keywords = entry.keywords.iter().map(|k| k.to_lowercase()).collect();
                (entry.topic, keywords)
            })
            .collect();

        Self {
            entries,
            default_topic: table.default_topic,
        }
    }

    pub fn embedded() -> Result<Self> {
        Ok(Self::new(KeywordTable::embedded()?))
    }

    pub fn default_topic(&self) -> Topic {
        self.default_topic
    }

    pub fn classify(&self, question: &str) -> Topic {
        let lowered = question.to_lowercase();

        self.entries
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k.as_str())))
            .map(|(topic, _)| *topic)
            .unwrap_or(self.default_topic)
    }
}
