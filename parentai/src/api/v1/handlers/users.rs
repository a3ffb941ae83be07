use axum::extract::{Path, State};
use validator::Validate;

use crate::api::extractors::{AppJson, AppQuery};
use crate::api::v1::dto::{
    ClearHistoryResponse, ExchangeResponse, HistoryQuery, ProfileResponse, UpdateProfileRequest,
};
use crate::api::v1::response::{ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::error::ParentAiError;
use crate::models::UserProfile;

fn profile_response(state: &AppState, profile: UserProfile) -> ProfileResponse {
    let grouper = state.assistant.grouper();
    let age_band = profile
        .child_age_months
        .map(|months| grouper.band(Some(months)));
    let insights = profile.insights(grouper.scheme());
    ProfileResponse::new(profile, age_band, insights)
}

/// `GET /api/v1/users/{userId}/profile`
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResponse<ProfileResponse> {
    match state.assistant.sessions().profile(&user_id).await {
        Ok(Some(profile)) => ApiResponse::success(profile_response(&state, profile)),
        Ok(None) => ParentAiError::NotFound(format!("User {user_id} not found")).into(),
        Err(e) => e.into(),
    }
}

/// `PUT /api/v1/users/{userId}/profile`
///
/// Creates the profile on first use.
pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> ApiResponse<ProfileResponse> {
    if let Err(errors) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, errors.to_string());
    }

    let sessions = state.assistant.sessions();
    let mut profile = match sessions.ensure_profile(&user_id).await {
        Ok(profile) => profile,
        Err(e) => return e.into(),
    };

    if let Some(name) = req.display_name {
        profile = match sessions.set_display_name(&user_id, Some(name)).await {
            Ok(profile) => profile,
            Err(e) => return e.into(),
        };
    }
    if let Some(months) = req.child_age_months {
        profile = match sessions.set_child_age(&user_id, Some(months)).await {
            Ok(profile) => profile,
            Err(e) => return e.into(),
        };
    }
    if let Some(context) = req.context {
        profile = match sessions.set_context(&user_id, &context).await {
            Ok(profile) => profile,
            Err(e) => return e.into(),
        };
    }

    tracing::debug!(user_id = %user_id, "Profile updated");
    ApiResponse::success(profile_response(&state, profile))
}

/// `GET /api/v1/users/{userId}/history?limit=`
pub async fn get_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    AppQuery(query): AppQuery<HistoryQuery>,
) -> ApiResponse<Vec<ExchangeResponse>> {
    match state
        .assistant
        .sessions()
        .history(&user_id, query.limit())
        .await
    {
        Ok(history) => ApiResponse::success(history.into_iter().map(Into::into).collect()),
        Err(e) => e.into(),
    }
}

/// `DELETE /api/v1/users/{userId}/history`
pub async fn clear_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResponse<ClearHistoryResponse> {
    match state.assistant.sessions().clear_history(&user_id).await {
        Ok(removed) => ApiResponse::success(ClearHistoryResponse { removed }),
        Err(e) => e.into(),
    }
}
