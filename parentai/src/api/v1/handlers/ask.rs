//! `POST /api/v1/ask`

use axum::extract::State;
use validator::Validate;

use crate::api::extractors::AppJson;
use crate::api::v1::dto::{AskRequest, AskResponse};
use crate::api::v1::response::{ApiResponse, ErrorCode};
use crate::api::AppState;

/// Answers one question. With a `userId`, the caller's stored child age and
/// context fill the gaps and the exchange is added to their history.
///
/// A completion outage still returns 200: the answer is the apology text
/// and `source` is `error_fallback`. A request cut short by shutdown is a 503.
pub async fn ask(
    State(state): State<AppState>,
    AppJson(req): AppJson<AskRequest>,
) -> ApiResponse<AskResponse> {
    if let Err(errors) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, errors.to_string());
    }
    if req.question.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Question cannot be empty");
    }

    let question = req.to_question();
    let cancel = state.shutdown.child_token();

    let result = match req.user_id.as_deref() {
        Some(user_id) => {
            state
                .assistant
                .answer_with_session(user_id, question, &cancel)
                .await
        }
        None => state.assistant.answer(&question, &cancel).await,
    };

    match result {
        Ok(answer) => {
            tracing::info!(
                topic = %answer.topic,
                age_band = %answer.age_band,
                source = %answer.source,
                "Answered question"
            );
            ApiResponse::success(answer.into())
        }
        Err(e) => e.into(),
    }
}
