use super::{KnowledgeBase, KnowledgeRecord};
use crate::models::{AgeBand, Topic};

/// Guidance found for a question, in the shape it was authored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guidance<'a> {
    Record {
        topic: Topic,
        band: AgeBand,
        record: &'a KnowledgeRecord,
    },
    Passage {
        topic: Topic,
        band: AgeBand,
        text: &'a str,
    },
    Generic(&'a str),
}

impl Guidance<'_> {
    pub fn is_generic(&self) -> bool {
        matches!(self, Guidance::Generic(_))
    }
}

/// One step of the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    /// Structured record for the exact (topic, band) pair.
    ExactRecord,
    /// Structured record for the narrowest authored band whose month range
    /// contains the question's band, e.g. `3-12_months` for a 5-month-old.
    CoveringRecord,
    /// Curated passage for the exact pair.
    ExactPassage,
    /// Curated passage for the narrowest covering band.
    CoveringPassage,
    /// Structured record for the topic's first authored band, whatever the
    /// age. Not part of the default chains.
    TopicRecord,
    /// Curated passage for the topic's first authored band, whatever the age.
    TopicPassage,
    /// The generic text. Always yields.
    GenericText,
}

impl LookupStrategy {
    pub fn lookup<'a>(
        &self,
        kb: &'a KnowledgeBase,
        topic: Topic,
        band: AgeBand,
    ) -> Option<Guidance<'a>> {
        match self {
            Self::ExactRecord => kb
                .record(topic, band)
                .map(|record| Guidance::Record { topic, band, record }),
            Self::CoveringRecord => covering_band(kb.bands_for(topic), band).and_then(|band| {
                kb.record(topic, band)
                    .map(|record| Guidance::Record { topic, band, record })
            }),
            Self::TopicRecord => kb.bands_for(topic).first().and_then(|&band| {
                kb.record(topic, band)
                    .map(|record| Guidance::Record { topic, band, record })
            }),
            Self::ExactPassage => kb
                .passage(topic, band)
                .map(|text| Guidance::Passage { topic, band, text }),
            Self::CoveringPassage => {
                covering_band(kb.passage_bands_for(topic), band).and_then(|band| {
                    kb.passage(topic, band)
                        .map(|text| Guidance::Passage { topic, band, text })
                })
            }
            Self::TopicPassage => kb.passage_bands_for(topic).first().and_then(|&band| {
                kb.passage(topic, band)
                    .map(|text| Guidance::Passage { topic, band, text })
            }),
            Self::GenericText => Some(Guidance::Generic(kb.generic_text())),
        }
    }
}

/// Narrowest authored band, other than `band` itself, whose months contain `band`.
fn covering_band(authored: &[AgeBand], band: AgeBand) -> Option<AgeBand> {
    authored
        .iter()
        .copied()
        .filter(|candidate| *candidate != band && candidate.covers(band))
        .min_by_key(|candidate| {
            let (start, end) = candidate.months();
            end - start
        })
}

/// An ordered list of lookup strategies; the first to yield wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupChain {
    strategies: Vec<LookupStrategy>,
}

impl LookupChain {
    pub fn new(strategies: Vec<LookupStrategy>) -> Self {
        Self { strategies }
    }

    /// Structured knowledge to feed a prompt. May yield nothing.
    pub fn for_prompt() -> Self {
        Self::new(vec![LookupStrategy::ExactRecord, LookupStrategy::CoveringRecord])
    }

    /// Canned text served without the completion service. Always yields.
    pub fn for_fallback() -> Self {
        Self::new(vec![
            LookupStrategy::ExactPassage,
            LookupStrategy::CoveringPassage,
            LookupStrategy::GenericText,
        ])
    }

    pub fn strategies(&self) -> &[LookupStrategy] {
        &self.strategies
    }

    pub fn resolve<'a>(
        &self,
        kb: &'a KnowledgeBase,
        topic: Topic,
        band: AgeBand,
    ) -> Option<Guidance<'a>> {
        self.strategies.iter().find_map(|strategy| {
            let found = strategy.lookup(kb, topic, band);
            if found.is_some() {
                tracing::debug!(?strategy, %topic, age_band = %band, "Knowledge lookup hit");
            }
            found
        })
    }
}
