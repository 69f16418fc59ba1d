use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::is_staff;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Exam, Question, QuestionOption, User};
use crate::db::types::{ExamLifecycle, QuestionType};
use crate::schemas::exam::{ExamResponse, QuestionCreate};
use crate::services::exam_status::compute_status;
use crate::store::QuestionWithOptions;

pub(super) async fn load_exam(state: &AppState, exam_id: &str) -> Result<Exam, ApiError> {
    state
        .store()
        .find_exam(exam_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))
}

/// Students only see published exams; drafts read as missing.
pub(super) async fn load_visible_exam(
    state: &AppState,
    user: &User,
    exam_id: &str,
) -> Result<Exam, ApiError> {
    let exam = load_exam(state, exam_id).await?;
    if !is_staff(user) && exam.lifecycle != ExamLifecycle::Published {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }
    Ok(exam)
}

pub(super) async fn exam_to_response(
    state: &AppState,
    exam: Exam,
    now: PrimitiveDateTime,
) -> Result<ExamResponse, ApiError> {
    let question_count = state.store().count_questions(&exam.id).await?;
    let status = compute_status(exam.lifecycle, exam.start_time, exam.end_time, now);
    Ok(ExamResponse::from_db(exam, status, question_count))
}

/// Turns an authoring payload into rows. Multiple-choice questions need at least two
/// options; essays take none.
pub(super) fn build_question(
    exam_id: &str,
    payload: QuestionCreate,
    default_order: i32,
) -> Result<QuestionWithOptions, ApiError> {
    match payload.question_type {
        QuestionType::MultipleChoice if payload.options.len() < 2 => {
            return Err(ApiError::BadRequest(
                "Multiple choice questions need at least two options".to_string(),
            ));
        }
        QuestionType::Essay if !payload.options.is_empty() => {
            return Err(ApiError::BadRequest("Essay questions cannot have options".to_string()));
        }
        _ => {}
    }

    let question = Question {
        id: Uuid::new_v4().to_string(),
        exam_id: exam_id.to_string(),
        content: payload.content,
        question_type: payload.question_type,
        order_index: payload.order_index.unwrap_or(default_order),
        points: payload.points,
        created_at: primitive_now_utc(),
    };

    let options = payload
        .options
        .into_iter()
        .enumerate()
        .map(|(position, option)| QuestionOption {
            id: Uuid::new_v4().to_string(),
            question_id: question.id.clone(),
            content: option.content,
            position: position as i32,
            is_correct: option.is_correct,
        })
        .collect();

    Ok(QuestionWithOptions { question, options })
}
