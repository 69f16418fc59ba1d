mod handlers;

use axum::{routing::get, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/global", get(handlers::global_ranking))
        .route("/weekly", get(handlers::weekly_ranking))
        .route("/classes", get(handlers::class_performance))
}
