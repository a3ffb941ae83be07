use axum::extract::State;

use crate::api::extractors::AppQuery;
use crate::api::v1::dto::{QuickRepliesQuery, QuickRepliesResponse, TopicResponse};
use crate::api::v1::response::{ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::models::Topic;

/// `GET /api/v1/topics`
pub async fn list_topics(State(state): State<AppState>) -> ApiResponse<Vec<TopicResponse>> {
    let knowledge = state.assistant.knowledge();
    let topics = Topic::ALL
        .iter()
        .map(|&topic| TopicResponse {
            id: topic,
            name: topic.display_name(),
            age_bands: knowledge.bands_for(topic).to_vec(),
        })
        .collect();

    ApiResponse::success(topics)
}

/// `GET /api/v1/quick-replies?topic=&ageMonths=`
pub async fn quick_replies(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<QuickRepliesQuery>,
) -> ApiResponse<QuickRepliesResponse> {
    let topic: Topic = match query.topic.parse() {
        Ok(topic) => topic,
        Err(_) => {
            return ApiResponse::error(
                ErrorCode::InvalidRequest,
                format!("Unknown topic: {}", query.topic),
            )
        }
    };

    let age_band = state.assistant.grouper().band(query.age_months);
    ApiResponse::success(QuickRepliesResponse {
        topic,
        age_band,
        replies: state.assistant.quick_replies(topic, query.age_months),
    })
}
