use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{AgeBand, Answer, AnswerSource, Question, Topic};

/// Request body for `POST /api/v1/ask`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    #[validate(length(min = 1, max = 4000))]
    pub question: String,
    /// Child's age in whole months. Falls back to the caller's profile.
    #[validate(range(max = 600))]
    pub age_months: Option<u32>,
    #[validate(length(max = 2000))]
    pub context: Option<String>,
    /// Known caller; the exchange is recorded in their history.
    #[validate(length(min = 1, max = 128))]
    pub user_id: Option<String>,
}

impl AskRequest {
    pub fn to_question(&self) -> Question {
        Question {
            text: self.question.clone(),
            age_months: self.age_months,
            context: self
                .context
                .as_ref()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub answer: String,
    pub topic: Topic,
    pub age_band: AgeBand,
    pub source: AnswerSource,
}

impl From<Answer> for AskResponse {
    fn from(answer: Answer) -> Self {
        Self {
            answer: answer.text,
            topic: answer.topic,
            age_band: answer.age_band,
            source: answer.source,
        }
    }
}
