use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AgeBand, AgeScheme, Topic};

/// One question/answer exchange in a caller's transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub question: String,
    pub answer: String,
    pub topic: Topic,
    pub timestamp: DateTime<Utc>,
    pub age_months: Option<u32>,
}

/// Per-caller state owned by a session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: Option<String>,
    pub child_age_months: Option<u32>,
    pub context: String,
    pub history: Vec<ConversationRecord>,
    pub total_questions: u64,
    /// Topics asked about, in first-seen order.
    pub favorite_topics: Vec<Topic>,
    pub registered_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            display_name: None,
            child_age_months: None,
            context: String::new(),
            history: Vec::new(),
            total_questions: 0,
            favorite_topics: Vec::new(),
            registered_at: now,
            last_activity: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn record(&mut self, record: ConversationRecord) {
        if !self.favorite_topics.contains(&record.topic) {
            self.favorite_topics.push(record.topic);
        }
        self.total_questions += 1;
        self.last_activity = record.timestamp;
        self.history.push(record);
    }

    /// The newest `limit` exchanges, oldest first.
    pub fn recent_history(&self, limit: usize) -> &[ConversationRecord] {
        let start = self.history.len().saturating_sub(limit);
        &self.history[start..]
    }

    /// One-line usage summary: question count, top three topics and child age band.
    pub fn insights(&self, scheme: AgeScheme) -> String {
        let mut insights = Vec::new();

        if self.total_questions > 0 {
            insights.push(format!("You have asked {} questions", self.total_questions));
        }

        if !self.favorite_topics.is_empty() {
            let names: Vec<&str> = self
                .favorite_topics
                .iter()
                .take(3)
                .map(Topic::display_name)
                .collect();
            insights.push(format!("Your favourite topics: {}", names.join(", ")));
        }

        if let Some(months) = self.child_age_months {
            let band: AgeBand = crate::classify::AgeGrouper::new(scheme).band(Some(months));
            insights.push(format!("Child's age: {}", band.label()));
        }

        if insights.is_empty() {
            "No data to analyse yet".to_string()
        } else {
            insights.join("; ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(question: &str, topic: Topic) -> ConversationRecord {
        ConversationRecord {
            question: question.to_string(),
            answer: format!("answer to {question}"),
            topic,
            timestamp: Utc::now(),
            age_months: Some(2),
        }
    }

    #[test]
    fn record_updates_counters_and_favourites() {
        let mut profile = UserProfile::new("42");
        profile.record(record("why is she crying", Topic::CryingAndComfort));
        profile.record(record("still crying", Topic::CryingAndComfort));
        profile.record(record("how to get him to sleep", Topic::SleepIssues));

        assert_eq!(profile.total_questions, 3);
        assert_eq!(
            profile.favorite_topics,
            vec![Topic::CryingAndComfort, Topic::SleepIssues]
        );
        assert_eq!(profile.history.len(), 3);
    }

    #[test]
    fn recent_history_keeps_newest() {
        let mut profile = UserProfile::new("42");
        for i in 0..7 {
            profile.record(record(&format!("q{i}"), Topic::SleepIssues));
        }

        let recent = profile.recent_history(5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].question, "q2");
        assert_eq!(recent[4].question, "q6");
        assert_eq!(profile.recent_history(50).len(), 7);
    }

    #[test]
    fn insights_for_empty_profile() {
        let profile = UserProfile::new("42");
        assert_eq!(profile.insights(AgeScheme::Detailed), "No data to analyse yet");
    }

    #[test]
    fn insights_summarise_activity() {
        let mut profile = UserProfile::new("42");
        profile.child_age_months = Some(8);
        profile.record(record("crying", Topic::CryingAndComfort));

        let insights = profile.insights(AgeScheme::Detailed);
        assert!(insights.contains("You have asked 1 questions"));
        assert!(insights.contains("Crying and comfort"));
        assert!(insights.contains("6-12 months"));
    }
}
