mod handlers;
mod helpers;
mod queries;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_exam).get(handlers::list_exams))
        .route(
            "/:exam_id",
            get(handlers::get_exam).patch(handlers::update_exam).delete(handlers::delete_exam),
        )
        .route("/:exam_id/publish", post(handlers::publish_exam))
        .route("/:exam_id/questions", post(handlers::add_question).get(handlers::list_questions))
        .route("/:exam_id/start", post(handlers::start_exam))
        .route("/:exam_id/latest-attempt", get(handlers::latest_attempt))
        .route("/:exam_id/analytics", get(handlers::exam_analytics))
}
