use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{
    is_staff, require_exam_owner, CurrentStudent, CurrentTeacher, CurrentUser,
};
use crate::api::pagination::PaginatedResponse;
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, to_primitive_utc};
use crate::db::models::Exam;
use crate::db::types::ExamLifecycle;
use crate::schemas::attempt::{AttemptResponse, StartAttemptResponse};
use crate::schemas::exam::{
    ExamCreate, ExamResponse, ExamUpdate, QuestionCreate, QuestionResponse,
    TakingQuestionResponse,
};
use crate::schemas::ranking::ExamAnalyticsResponse;
use crate::services::exam_status::{compute_status, validate_schedule};
use crate::services::{attempt_engine, ranking, scoring};
use crate::store::FinalizedAttemptFilter;

use super::helpers;
use super::queries::ListExamsQuery;

pub(super) async fn create_exam(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<ExamCreate>,
) -> Result<(StatusCode, Json<ExamResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let start_time = payload.start_time.map(to_primitive_utc);
    let end_time = payload.end_time.map(to_primitive_utc);
    validate_schedule(start_time, end_time).map_err(ApiError::BadRequest)?;

    let now = primitive_now_utc();
    let exam = Exam {
        id: Uuid::new_v4().to_string(),
        title: payload.title,
        description: payload.description,
        start_time,
        end_time,
        duration_minutes: payload.duration_minutes,
        randomize_questions: payload.randomize_questions,
        category: payload.category,
        lifecycle: ExamLifecycle::Draft,
        total_points: payload.total_points,
        created_by: user.id.clone(),
        created_at: now,
        updated_at: now,
    };

    let questions = payload
        .questions
        .into_iter()
        .enumerate()
        .map(|(index, question)| helpers::build_question(&exam.id, question, index as i32))
        .collect::<Result<Vec<_>, _>>()?;

    state.store().insert_exam(&exam, &questions).await?;
    tracing::info!(
        exam_id = %exam.id,
        created_by = %user.id,
        questions = questions.len(),
        "Exam created"
    );

    let response = helpers::exam_to_response(&state, exam, now).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub(super) async fn list_exams(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<ListExamsQuery>,
) -> Result<Json<PaginatedResponse<ExamResponse>>, ApiError> {
    let page = params.page();
    let now = primitive_now_utc();

    let published_only = !is_staff(&user);
    let exams: Vec<Exam> = state
        .store()
        .list_exams(published_only)
        .await?
        .into_iter()
        .filter(|exam| {
            params.status.map_or(true, |status| {
                compute_status(exam.lifecycle, exam.start_time, exam.end_time, now) == status
            })
        })
        .collect();

    let total_count = exams.len() as i64;
    let mut items = Vec::new();
    for exam in exams.into_iter().skip(page.skip as usize).take(page.limit as usize) {
        items.push(helpers::exam_to_response(&state, exam, now).await?);
    }

    Ok(Json(PaginatedResponse::new(items, total_count, page)))
}

pub(super) async fn get_exam(
    Path(exam_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ExamResponse>, ApiError> {
    let exam = helpers::load_visible_exam(&state, &user, &exam_id).await?;
    Ok(Json(helpers::exam_to_response(&state, exam, primitive_now_utc()).await?))
}

pub(super) async fn update_exam(
    Path(exam_id): Path<String>,
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<ExamUpdate>,
) -> Result<Json<ExamResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let mut exam = helpers::load_exam(&state, &exam_id).await?;
    require_exam_owner(&user, &exam.created_by)?;

    if let Some(title) = payload.title {
        exam.title = title;
    }
    if let Some(description) = payload.description {
        exam.description = Some(description);
    }
    if let Some(start_time) = payload.start_time {
        exam.start_time = Some(to_primitive_utc(start_time));
    }
    if let Some(end_time) = payload.end_time {
        exam.end_time = Some(to_primitive_utc(end_time));
    }
    if let Some(duration_minutes) = payload.duration_minutes {
        exam.duration_minutes = duration_minutes;
    }
    if let Some(randomize_questions) = payload.randomize_questions {
        exam.randomize_questions = randomize_questions;
    }
    if let Some(category) = payload.category {
        exam.category = Some(category);
    }
    if let Some(total_points) = payload.total_points {
        exam.total_points = Some(total_points);
    }

    validate_schedule(exam.start_time, exam.end_time).map_err(ApiError::BadRequest)?;

    let now = primitive_now_utc();
    exam.updated_at = now;
    state.store().update_exam(&exam).await?;

    Ok(Json(helpers::exam_to_response(&state, exam, now).await?))
}

pub(super) async fn delete_exam(
    Path(exam_id): Path<String>,
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let exam = helpers::load_exam(&state, &exam_id).await?;
    require_exam_owner(&user, &exam.created_by)?;

    if !state.store().delete_exam(&exam.id).await? {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }
    tracing::info!(exam_id = %exam.id, deleted_by = %user.id, "Exam deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn publish_exam(
    Path(exam_id): Path<String>,
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<ExamResponse>, ApiError> {
    let mut exam = helpers::load_exam(&state, &exam_id).await?;
    require_exam_owner(&user, &exam.created_by)?;

    let now = primitive_now_utc();
    if exam.lifecycle != ExamLifecycle::Published {
        exam.lifecycle = ExamLifecycle::Published;
        exam.updated_at = now;
        state.store().update_exam(&exam).await?;
        tracing::info!(exam_id = %exam.id, "Exam published");
    }

    Ok(Json(helpers::exam_to_response(&state, exam, now).await?))
}

pub(super) async fn add_question(
    Path(exam_id): Path<String>,
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<QuestionCreate>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let exam = helpers::load_exam(&state, &exam_id).await?;
    require_exam_owner(&user, &exam.created_by)?;

    let next_order = state.store().count_questions(&exam.id).await?;
    let question = helpers::build_question(&exam.id, payload, next_order as i32)?;
    state.store().insert_question(&question).await?;

    Ok((StatusCode::CREATED, Json(QuestionResponse::from(question))))
}

/// Taking view: option correctness is never exposed here.
pub(super) async fn list_questions(
    Path(exam_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<TakingQuestionResponse>>, ApiError> {
    let exam = helpers::load_visible_exam(&state, &user, &exam_id).await?;
    let limit = state.settings().exam().random_question_limit;
    let mut rng = StdRng::from_entropy();

    let questions =
        attempt_engine::questions_for_exam(state.store(), &exam.id, limit, &mut rng).await?;

    Ok(Json(questions.into_iter().map(TakingQuestionResponse::from).collect()))
}

pub(super) async fn start_exam(
    Path(exam_id): Path<String>,
    CurrentStudent { user, student }: CurrentStudent,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<StartAttemptResponse>), ApiError> {
    let exam = helpers::load_visible_exam(&state, &user, &exam_id).await?;
    let opened = attempt_engine::start_exam(state.store(), &exam.id, &student.id).await?;

    let status = if opened.created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(StartAttemptResponse {
            attempt: AttemptResponse::from(opened.attempt),
            resumed: !opened.created,
        }),
    ))
}

pub(super) async fn latest_attempt(
    Path(exam_id): Path<String>,
    CurrentStudent { student, .. }: CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<AttemptResponse>, ApiError> {
    let attempt = attempt_engine::latest_attempt(state.store(), &exam_id, &student.id).await?;
    Ok(Json(AttemptResponse::from(attempt)))
}

pub(super) async fn exam_analytics(
    Path(exam_id): Path<String>,
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<ExamAnalyticsResponse>, ApiError> {
    let exam = helpers::load_exam(&state, &exam_id).await?;
    require_exam_owner(&user, &exam.created_by)?;

    let question_count = state.store().count_questions(&exam.id).await?;
    let max_score = scoring::max_achievable_score(exam.total_points, question_count);
    let filter = FinalizedAttemptFilter { exam_id: Some(exam.id.clone()), ..Default::default() };
    let rows = state.store().list_finalized_attempts(&filter).await?;

    Ok(Json(ranking::exam_analytics(&exam.id, &exam.title, max_score, &rows)))
}
