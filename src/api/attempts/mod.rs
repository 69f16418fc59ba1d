mod handlers;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/my", get(handlers::list_my_attempts))
        .route("/:attempt_id/answers", post(handlers::submit_answer))
        .route("/:attempt_id/essays", post(handlers::submit_essay))
        .route("/:attempt_id/finish", post(handlers::finish_exam))
        .route("/:attempt_id/review", get(handlers::review_attempt))
}
