use axum::{
    routing::{get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;

pub fn v1_router() -> Router<AppState> {
    let users = Router::new()
        .route(
            "/{userId}/profile",
            get(handlers::users::get_profile).put(handlers::users::update_profile),
        )
        .route(
            "/{userId}/history",
            get(handlers::users::get_history).delete(handlers::users::clear_history),
        );

    Router::new()
        .route("/ask", post(handlers::ask::ask))
        .route("/topics", get(handlers::topics::list_topics))
        .route("/quick-replies", get(handlers::topics::quick_replies))
        .nest("/users", users)
}
