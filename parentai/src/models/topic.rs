use serde::{Deserialize, Serialize};

/// Subject-matter label used to select guidance content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    CryingAndComfort,
    SleepIssues,
    DisciplineAndBoundaries,
    DevelopmentMilestones,
    ReadingInterest,
    KindergartenAdaptation,
    ParentingPhilosophy,
    AttachmentTheory,
    FeedingNutrition,
    SafetyBehavior,
    MedicalCheckups,
    AgeAppropriateActivities,
}

impl Topic {
    pub const ALL: [Topic; 12] = [
        Topic::CryingAndComfort,
        Topic::SleepIssues,
        Topic::DisciplineAndBoundaries,
        Topic::DevelopmentMilestones,
        Topic::ReadingInterest,
        Topic::KindergartenAdaptation,
        Topic::ParentingPhilosophy,
        Topic::AttachmentTheory,
        Topic::FeedingNutrition,
        Topic::SafetyBehavior,
        Topic::MedicalCheckups,
        Topic::AgeAppropriateActivities,
    ];

    /// Topic used when no keyword matches.
    pub const DEFAULT: Topic = Topic::ParentingPhilosophy;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CryingAndComfort => "crying_and_comfort",
            Self::SleepIssues => "sleep_issues",
            Self::DisciplineAndBoundaries => "discipline_and_boundaries",
            Self::DevelopmentMilestones => "development_milestones",
            Self::ReadingInterest => "reading_interest",
            Self::KindergartenAdaptation => "kindergarten_adaptation",
            Self::ParentingPhilosophy => "parenting_philosophy",
            Self::AttachmentTheory => "attachment_theory",
            Self::FeedingNutrition => "feeding_nutrition",
            Self::SafetyBehavior => "safety_behavior",
            Self::MedicalCheckups => "medical_checkups",
            Self::AgeAppropriateActivities => "age_appropriate_activities",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CryingAndComfort => "Crying and comfort",
            Self::SleepIssues => "Sleep issues",
            Self::DisciplineAndBoundaries => "Discipline and boundaries",
            Self::DevelopmentMilestones => "Development milestones",
            Self::ReadingInterest => "Interest in reading",
            Self::KindergartenAdaptation => "Kindergarten adaptation",
            Self::ParentingPhilosophy => "Parenting philosophy",
            Self::AttachmentTheory => "Attachment",
            Self::FeedingNutrition => "Feeding and nutrition",
            Self::SafetyBehavior => "Safety and behavior",
            Self::MedicalCheckups => "Medical checkups",
            Self::AgeAppropriateActivities => "Age-appropriate activities",
        }
    }
}

impl Default for Topic {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Topic::ALL
            .into_iter()
            .find(|topic| topic.as_str() == normalized)
            .ok_or_else(|| format!("Unknown topic: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_roundtrips_through_wire_tag() {
        for topic in Topic::ALL {
            let json = serde_json::to_string(&topic).unwrap();
            assert_eq!(json, format!("\"{}\"", topic.as_str()));
            assert_eq!(topic.as_str().parse::<Topic>().unwrap(), topic);
        }
    }

    #[test]
    fn default_topic_is_parenting_philosophy() {
        assert_eq!(Topic::default(), Topic::ParentingPhilosophy);
    }

    #[test]
    fn unknown_topic_fails_to_parse() {
        assert!("crying".parse::<Topic>().is_err());
    }
}
