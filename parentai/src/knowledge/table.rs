use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ParentAiError, Result};
use crate::models::{AgeBand, Topic};

const DEFAULT_KNOWLEDGE: &str = include_str!("../../data/knowledge.json");

/// A named list of guidance items, e.g. `common_causes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub items: Vec<String>,
}

/// Structured guidance for one (topic, age band) pair.
///
/// Categories keep their authored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    pub categories: Vec<Category>,
}

impl KnowledgeRecord {
    pub fn category(&self, name: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.items.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.categories.iter().all(|c| c.items.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RecordEntry {
    topic: Topic,
    age_band: AgeBand,
    categories: Vec<Category>,
}

#[derive(Debug, Clone, Deserialize)]
struct PassageEntry {
    topic: Topic,
    age_band: AgeBand,
    text: String,
}

/// Which category feeds quick replies for a topic, and how many items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReplyRule {
    pub topic: Topic,
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
struct KnowledgeFile {
    version: u32,
    #[serde(default)]
    records: Vec<RecordEntry>,
    #[serde(default)]
    passages: Vec<PassageEntry>,
    generic_text: String,
    #[serde(default)]
    quick_replies: Vec<QuickReplyRule>,
}

/// Read-only guidance tables keyed by topic and age band.
///
/// Loaded once at start. Each topic also remembers the order in which its
/// bands were authored.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    version: u32,
    records: HashMap<(Topic, AgeBand), KnowledgeRecord>,
    record_bands: HashMap<Topic, Vec<AgeBand>>,
    passages: HashMap<(Topic, AgeBand), String>,
    passage_bands: HashMap<Topic, Vec<AgeBand>>,
    generic_text: String,
    quick_replies: Vec<QuickReplyRule>,
}

impl KnowledgeBase {
    /// The tables shipped with the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_json(DEFAULT_KNOWLEDGE)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let file: KnowledgeFile = serde_json::from_str(raw)
            .map_err(|e| ParentAiError::Knowledge(format!("Invalid knowledge table: {e}")))?;

        let mut records = HashMap::new();
        let mut record_bands: HashMap<Topic, Vec<AgeBand>> = HashMap::new();
        for entry in file.records {
            let key = (entry.topic, entry.age_band);
            let record = KnowledgeRecord {
                categories: entry.categories,
            };
            if records.insert(key, record).is_some() {
                return Err(ParentAiError::Knowledge(format!(
                    "Duplicate record for {} / {}",
                    entry.topic, entry.age_band
                )));
            }
            record_bands.entry(entry.topic).or_default().push(entry.age_band);
        }

        let mut passages = HashMap::new();
        let mut passage_bands: HashMap<Topic, Vec<AgeBand>> = HashMap::new();
        for entry in file.passages {
            if entry.text.trim().is_empty() {
                return Err(ParentAiError::Knowledge(format!(
                    "Empty passage for {} / {}",
                    entry.topic, entry.age_band
                )));
            }
            if passages
                .insert((entry.topic, entry.age_band), entry.text)
                .is_some()
            {
                return Err(ParentAiError::Knowledge(format!(
                    "Duplicate passage for {} / {}",
                    entry.topic, entry.age_band
                )));
            }
            passage_bands.entry(entry.topic).or_default().push(entry.age_band);
        }

        if file.generic_text.trim().is_empty() {
            return Err(ParentAiError::Knowledge(
                "generic_text must not be empty".to_string(),
            ));
        }

        Ok(Self {
            version: file.version,
            records,
            record_bands,
            passages,
            passage_bands,
            generic_text: file.generic_text,
            quick_replies: file.quick_replies,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// The record for exactly this pair, if authored.
    pub fn record(&self, topic: Topic, band: AgeBand) -> Option<&KnowledgeRecord> {
        self.records.get(&(topic, band))
    }

    /// The curated passage for exactly this pair, if authored.
    pub fn passage(&self, topic: Topic, band: AgeBand) -> Option<&str> {
        self.passages.get(&(topic, band)).map(String::as_str)
    }

    pub fn generic_text(&self) -> &str {
        &self.generic_text
    }

    /// Topics that have at least one structured record, in [`Topic::ALL`] order.
    pub fn topics(&self) -> Vec<Topic> {
        Topic::ALL
            .into_iter()
            .filter(|topic| self.record_bands.contains_key(topic))
            .collect()
    }

    /// Bands with a structured record for `topic`, in authored order.
    pub fn bands_for(&self, topic: Topic) -> &[AgeBand] {
        self.record_bands
            .get(&topic)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Bands with a passage for `topic`, in authored order.
    pub fn passage_bands_for(&self, topic: Topic) -> &[AgeBand] {
        self.passage_bands
            .get(&topic)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First few items of the topic's quick-reply category for this band.
    ///
    /// Empty when the topic has no quick-reply rule or no record for the band.
    pub fn quick_responses(&self, topic: Topic, band: AgeBand) -> Vec<String> {
        let Some(rule) = self.quick_replies.iter().find(|r| r.topic == topic) else {
            return Vec::new();
        };

        self.record(topic, band)
            .and_then(|record| record.category(&rule.category))
            .map(|items| items.iter().take(rule.count).cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::embedded().expect("embedded knowledge table must parse")
    }

    #[test]
    fn exact_record_matches_authored_content() {
        let kb = kb();
        let record = kb
            .record(Topic::CryingAndComfort, AgeBand::ZeroToThreeMonths)
            .unwrap();

        let names: Vec<&str> = record.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["common_causes", "response_steps", "when_to_worry"]);
        assert_eq!(
            record.category("common_causes").unwrap()[0],
            "Hunger - check if it's been 2-3 hours since last feeding"
        );
        assert_eq!(record.category("when_to_worry").unwrap().len(), 4);
    }

    #[test]
    fn every_record_round_trips_the_authored_json() {
        let kb = kb();
        let authored: serde_json::Value = serde_json::from_str(DEFAULT_KNOWLEDGE).unwrap();
        let entries = authored["records"].as_array().unwrap();
        assert!(!entries.is_empty());

        for entry in entries {
            let topic: Topic = serde_json::from_value(entry["topic"].clone()).unwrap();
            let band: AgeBand = serde_json::from_value(entry["age_band"].clone()).unwrap();
            let expected = KnowledgeRecord {
                categories: serde_json::from_value(entry["categories"].clone()).unwrap(),
            };

            assert_eq!(kb.record(topic, band), Some(&expected), "{topic} / {band}");
            assert_eq!(
                serde_json::to_value(kb.record(topic, band).unwrap()).unwrap()["categories"],
                entry["categories"]
            );
        }
    }

    #[test]
    fn missing_pair_is_none() {
        let kb = kb();
        assert!(kb.record(Topic::SleepIssues, AgeBand::ZeroToThreeMonths).is_none());
        assert!(kb
            .record(Topic::CryingAndComfort, AgeBand::ThreeToTwelveMonths)
            .is_none());
    }

    #[test]
    fn topics_and_bands() {
        let kb = kb();
        assert_eq!(
            kb.topics(),
            vec![
                Topic::CryingAndComfort,
                Topic::MedicalCheckups,
                Topic::AgeAppropriateActivities,
            ]
        );
        assert_eq!(
            kb.bands_for(Topic::MedicalCheckups),
            &[
                AgeBand::ZeroToThreeMonths,
                AgeBand::ThreeToSixMonths,
                AgeBand::SixToTwelveMonths,
                AgeBand::OneToThreeYears,
            ]
        );
        assert!(kb.bands_for(Topic::ReadingInterest).is_empty());
    }

    #[test]
    fn quick_responses_take_configured_prefix() {
        let kb = kb();
        assert_eq!(
            kb.quick_responses(Topic::CryingAndComfort, AgeBand::ZeroToThreeMonths)
                .len(),
            3
        );
        assert_eq!(
            kb.quick_responses(Topic::MedicalCheckups, AgeBand::OneToThreeYears),
            vec![
                "18 months: Developmental screening".to_string(),
                "24 months: 2-year checkup".to_string(),
            ]
        );
        assert!(kb
            .quick_responses(Topic::SleepIssues, AgeBand::ZeroToThreeMonths)
            .is_empty());
    }

    #[test]
    fn passages_are_keyed_by_authored_band() {
        let kb = kb();
        assert!(kb
            .passage(Topic::KindergartenAdaptation, AgeBand::TwoToThreeYears)
            .is_some());
        assert!(kb
            .passage(Topic::KindergartenAdaptation, AgeBand::OneToThreeYears)
            .is_none());
        assert!(!kb.generic_text().is_empty());
    }

    #[test]
    fn duplicate_record_is_rejected() {
        let raw = r#"{
            "version": 1,
            "records": [
                {"topic": "sleep_issues", "age_band": "0-3_months", "categories": []},
                {"topic": "sleep_issues", "age_band": "0-3_months", "categories": []}
            ],
            "generic_text": "be kind"
        }"#;
        assert!(matches!(
            KnowledgeBase::from_json(raw),
            Err(ParentAiError::Knowledge(_))
        ));
    }

    #[test]
    fn empty_generic_text_is_rejected() {
        let raw = r#"{"version": 1, "generic_text": "  "}"#;
        assert!(KnowledgeBase::from_json(raw).is_err());
    }
}
