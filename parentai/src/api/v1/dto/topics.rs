use serde::{Deserialize, Serialize};

use crate::models::{AgeBand, Topic};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicResponse {
    pub id: Topic,
    pub name: &'static str,
    /// Bands with structured guidance, in authored order. Empty when the
    /// topic is only covered by passages or the generic text.
    pub age_bands: Vec<AgeBand>,
}

/// Query string of `GET /api/v1/quick-replies`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickRepliesQuery {
    pub topic: String,
    pub age_months: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickRepliesResponse {
    pub topic: Topic,
    pub age_band: AgeBand,
    pub replies: Vec<String>,
}
