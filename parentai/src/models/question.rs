use serde::{Deserialize, Serialize};

use super::{AgeBand, Topic};

/// An inbound caregiver question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub age_months: Option<u32>,
    /// Free-text context supplied by the caller, e.g. "first child, breastfed".
    pub context: Option<String>,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            age_months: None,
            context: None,
        }
    }

    pub fn with_age(mut self, age_months: u32) -> Self {
        self.age_months = Some(age_months);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Caller context, or the empty string when none was given.
    pub fn context_or_empty(&self) -> &str {
        self.context.as_deref().unwrap_or("")
    }
}

/// Where the text of an [`Answer`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    /// Generated by the completion service from an assembled prompt.
    Generated,
    /// Canned guidance served because no relevant knowledge was found.
    KnowledgeFallback,
    /// Apology served because the completion service could not be reached.
    ErrorFallback,
}

impl std::fmt::Display for AnswerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generated => write!(f, "generated"),
            Self::KnowledgeFallback => write!(f, "knowledge_fallback"),
            Self::ErrorFallback => write!(f, "error_fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub topic: Topic,
    pub age_band: AgeBand,
    pub source: AnswerSource,
}
