use axum::extract::{Path, Query, State};
use axum::Json;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentStudent, CurrentUser};
use crate::api::pagination::{PageParams, PaginatedResponse};
use crate::core::state::AppState;
use crate::db::models::{ExamAttempt, Student};
use crate::db::types::UserRole;
use crate::schemas::attempt::{
    AnswerResponse, AnswerSubmit, AttemptResponse, EssaySubmit, ReviewResponse,
};
use crate::services::attempt_engine;
use crate::services::scoring::ExamResult;

/// Loads the attempt and checks it belongs to the calling student.
async fn load_own_attempt(
    state: &AppState,
    student: &Student,
    attempt_id: &str,
) -> Result<ExamAttempt, ApiError> {
    let attempt = attempt_engine::load_attempt(state.store(), attempt_id).await?;
    if attempt.student_id != student.id {
        return Err(ApiError::Forbidden("Attempt belongs to another student"));
    }
    Ok(attempt)
}

pub(super) async fn list_my_attempts(
    CurrentStudent { student, .. }: CurrentStudent,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<PaginatedResponse<AttemptResponse>>, ApiError> {
    let page = params.normalized();
    let (items, total_count) =
        attempt_engine::list_my_attempts(state.store(), &student.id, page.skip, page.limit)
            .await?;

    Ok(Json(PaginatedResponse::new(
        items.into_iter().map(AttemptResponse::from).collect(),
        total_count,
        page,
    )))
}

pub(super) async fn submit_answer(
    Path(attempt_id): Path<String>,
    CurrentStudent { student, .. }: CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<AnswerSubmit>,
) -> Result<Json<AnswerResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let attempt = load_own_attempt(&state, &student, &attempt_id).await?;

    let answer = attempt_engine::submit_answer(
        state.store(),
        &attempt.id,
        &payload.question_id,
        &payload.option_id,
    )
    .await?;

    Ok(Json(AnswerResponse::from(answer)))
}

pub(super) async fn submit_essay(
    Path(attempt_id): Path<String>,
    CurrentStudent { student, .. }: CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<EssaySubmit>,
) -> Result<Json<AnswerResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let attempt = load_own_attempt(&state, &student, &attempt_id).await?;

    let answer = attempt_engine::submit_essay(
        state.store(),
        &attempt.id,
        &payload.question_id,
        &payload.text,
    )
    .await?;

    Ok(Json(AnswerResponse::from(answer)))
}

pub(super) async fn finish_exam(
    Path(attempt_id): Path<String>,
    CurrentStudent { student, .. }: CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<ExamResult>, ApiError> {
    let attempt = load_own_attempt(&state, &student, &attempt_id).await?;
    let result = attempt_engine::finish_exam(state.store(), &attempt.id).await?;
    Ok(Json(result))
}

/// Students review their own attempts; admins may review any attempt.
pub(super) async fn review_attempt(
    Path(attempt_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ReviewResponse>, ApiError> {
    if user.role != UserRole::Admin {
        let student = attempt_engine::resolve_student(state.store(), &user.id).await?;
        load_own_attempt(&state, &student, &attempt_id).await?;
    }

    let review = attempt_engine::review_attempt(state.store(), &attempt_id).await?;
    Ok(Json(ReviewResponse::from(review)))
}
