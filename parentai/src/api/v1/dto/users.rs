use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{AgeBand, ConversationRecord, Topic, UserProfile};

/// Request body for `PUT /api/v1/users/{userId}/profile`. Absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,
    #[validate(range(max = 600))]
    pub child_age_months: Option<u32>,
    #[validate(length(max = 2000))]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_age_months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_band: Option<AgeBand>,
    pub context: String,
    pub total_questions: u64,
    pub favorite_topics: Vec<Topic>,
    pub insights: String,
    pub registered_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl ProfileResponse {
    pub fn new(profile: UserProfile, age_band: Option<AgeBand>, insights: String) -> Self {
        Self {
            user_id: profile.user_id,
            display_name: profile.display_name,
            child_age_months: profile.child_age_months,
            age_band,
            context: profile.context,
            total_questions: profile.total_questions,
            favorite_topics: profile.favorite_topics,
            insights,
            registered_at: profile.registered_at,
            last_activity: profile.last_activity,
        }
    }
}

/// Query string of `GET /api/v1/users/{userId}/history`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    /// Clamped to `1..=100`, defaults to 10.
    pub limit: Option<usize>,
}

impl HistoryQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(10).clamp(1, 100)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeResponse {
    pub question: String,
    pub answer: String,
    pub topic: Topic,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_months: Option<u32>,
}

impl From<ConversationRecord> for ExchangeResponse {
    fn from(record: ConversationRecord) -> Self {
        Self {
            question: record.question,
            answer: record.answer,
            topic: record.topic,
            timestamp: record.timestamp,
            age_months: record.age_months,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearHistoryResponse {
    pub removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_limit_is_clamped() {
        assert_eq!(HistoryQuery { limit: None }.limit(), 10);
        assert_eq!(HistoryQuery { limit: Some(0) }.limit(), 1);
        assert_eq!(HistoryQuery { limit: Some(500) }.limit(), 100);
    }

    #[test]
    fn profile_serializes_camel_case() {
        let mut profile = UserProfile::new("u1");
        profile.child_age_months = Some(5);
        let json = serde_json::to_value(ProfileResponse::new(
            profile,
            Some(AgeBand::ThreeToSixMonths),
            "No data to analyse yet".into(),
        ))
        .unwrap();

        assert_eq!(json["userId"], "u1");
        assert_eq!(json["childAgeMonths"], 5);
        assert_eq!(json["ageBand"], "3-6_months");
        assert!(json.get("displayName").is_none());
    }
}
