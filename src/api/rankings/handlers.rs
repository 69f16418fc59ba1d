use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentTeacher, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::schemas::ranking::{ClassPerformance, RankingResponse};
use crate::services::ranking;
use crate::store::FinalizedAttemptFilter;

const MAX_RANKING_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
pub(super) struct RankingQuery {
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
enum RankingScope {
    Global,
    Weekly,
}

impl RankingScope {
    fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Weekly => "weekly",
        }
    }
}

async fn ranking_response(
    state: &AppState,
    scope: RankingScope,
    limit: Option<usize>,
) -> Result<RankingResponse, ApiError> {
    let limit = limit
        .unwrap_or(state.settings().ranking().default_limit)
        .clamp(1, MAX_RANKING_LIMIT);
    let cache_key = format!("rankings:{}:{limit}", scope.as_str());

    if let Some(cached) = state.redis().get_json::<RankingResponse>(&cache_key).await {
        return Ok(cached);
    }

    let now = primitive_now_utc();
    let filter = match scope {
        RankingScope::Global => FinalizedAttemptFilter::default(),
        RankingScope::Weekly => FinalizedAttemptFilter {
            ended_after: Some(ranking::weekly_cutoff(now)),
            ..Default::default()
        },
    };
    let rows = state.store().list_finalized_attempts(&filter).await?;

    let response = RankingResponse {
        scope: scope.as_str().to_string(),
        generated_at: format_primitive(now),
        items: ranking::rank_students(&rows, limit),
    };
    state
        .redis()
        .set_json(&cache_key, &response, state.settings().ranking().cache_ttl_seconds)
        .await;

    Ok(response)
}

pub(super) async fn global_ranking(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<RankingQuery>,
) -> Result<Json<RankingResponse>, ApiError> {
    Ok(Json(ranking_response(&state, RankingScope::Global, params.limit).await?))
}

pub(super) async fn weekly_ranking(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<RankingQuery>,
) -> Result<Json<RankingResponse>, ApiError> {
    Ok(Json(ranking_response(&state, RankingScope::Weekly, params.limit).await?))
}

pub(super) async fn class_performance(
    CurrentTeacher(_user): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<ClassPerformance>>, ApiError> {
    let classes = state.store().list_classes().await?;
    let rows = state.store().list_finalized_attempts(&FinalizedAttemptFilter::default()).await?;
    Ok(Json(ranking::class_performance(&classes, &rows)))
}
