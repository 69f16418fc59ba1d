//! Exam-attempt lifecycle: open or resume an attempt, record answers, finalize by
//! scoring and project the attempt for review.
//!
//! Every function takes the store as `&dyn Store` so the same rules run against
//! Postgres in production and the in-memory store in tests.

use std::collections::HashMap;

use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::{ExamAnswer, ExamAttempt, Question, QuestionOption, Student};
use crate::db::types::QuestionType;
use crate::services::question_selection::select_questions;
use crate::services::scoring::{self, ExamResult};
use crate::store::{OpenedAttempt, QuestionWithOptions, Store, StoreError};

#[derive(Debug, Error)]
pub(crate) enum EngineError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("Attempt is already submitted")]
    AttemptClosed,
    #[error("Attempt is not submitted yet")]
    AttemptOpen,
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AttemptNotFound(_) => Self::NotFound("Attempt"),
            StoreError::AttemptClosed(_) => Self::AttemptClosed,
            other => Self::Store(other),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ReviewItem {
    pub(crate) question: Question,
    pub(crate) options: Vec<QuestionOption>,
    pub(crate) answer: ExamAnswer,
}

#[derive(Debug, Clone)]
pub(crate) struct AttemptReview {
    pub(crate) attempt: ExamAttempt,
    pub(crate) exam_title: String,
    pub(crate) items: Vec<ReviewItem>,
}

pub(crate) async fn resolve_student(
    store: &dyn Store,
    user_id: &str,
) -> Result<Student, EngineError> {
    store.find_student_by_user(user_id).await?.ok_or(EngineError::NotFound("Student profile"))
}

pub(crate) async fn load_attempt(
    store: &dyn Store,
    attempt_id: &str,
) -> Result<ExamAttempt, EngineError> {
    store.find_attempt(attempt_id).await?.ok_or(EngineError::NotFound("Attempt"))
}

/// Returns the open attempt for the pair, creating one when the latest attempt is
/// submitted or none exists.
pub(crate) async fn start_exam(
    store: &dyn Store,
    exam_id: &str,
    student_id: &str,
) -> Result<OpenedAttempt, EngineError> {
    if store.find_exam(exam_id).await?.is_none() {
        return Err(EngineError::NotFound("Exam"));
    }

    let now = primitive_now_utc();
    let candidate = ExamAttempt {
        id: Uuid::new_v4().to_string(),
        exam_id: exam_id.to_string(),
        student_id: student_id.to_string(),
        started_at: now,
        ended_at: None,
        submitted: false,
        score: None,
        created_at: now,
    };

    let opened = store.open_attempt(&candidate).await?;
    if opened.created {
        metrics::counter!("exam_attempts_started_total").increment(1);
        tracing::info!(
            attempt_id = %opened.attempt.id,
            exam_id,
            student_id,
            "Exam attempt started"
        );
    } else {
        tracing::debug!(
            attempt_id = %opened.attempt.id,
            exam_id,
            student_id,
            "Exam attempt resumed"
        );
    }

    Ok(opened)
}

async fn load_question_for_attempt(
    store: &dyn Store,
    attempt: &ExamAttempt,
    question_id: &str,
) -> Result<Question, EngineError> {
    let question =
        store.find_question(question_id).await?.ok_or(EngineError::NotFound("Question"))?;
    if question.exam_id != attempt.exam_id {
        return Err(EngineError::Validation(
            "Question does not belong to the attempt's exam".to_string(),
        ));
    }
    Ok(question)
}

fn new_answer(
    attempt_id: &str,
    question_id: &str,
    selected_option_id: Option<String>,
    essay_text: Option<String>,
    is_correct: Option<bool>,
) -> ExamAnswer {
    let now = primitive_now_utc();
    ExamAnswer {
        id: Uuid::new_v4().to_string(),
        attempt_id: attempt_id.to_string(),
        question_id: question_id.to_string(),
        selected_option_id,
        essay_text,
        is_correct,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) async fn submit_answer(
    store: &dyn Store,
    attempt_id: &str,
    question_id: &str,
    option_id: &str,
) -> Result<ExamAnswer, EngineError> {
    let attempt = load_attempt(store, attempt_id).await?;
    let question = load_question_for_attempt(store, &attempt, question_id).await?;
    let option = store.find_option(option_id).await?.ok_or(EngineError::NotFound("Option"))?;

    if question.question_type != QuestionType::MultipleChoice {
        return Err(EngineError::Validation(
            "Question does not accept a selected option".to_string(),
        ));
    }
    if option.question_id != question.id {
        return Err(EngineError::Validation(
            "Option does not belong to the question".to_string(),
        ));
    }
    if attempt.submitted {
        return Err(EngineError::AttemptClosed);
    }

    let answer = new_answer(
        &attempt.id,
        &question.id,
        Some(option.id.clone()),
        None,
        Some(option.is_correct),
    );
    let stored = store.save_answer(&answer).await?;
    metrics::counter!("exam_answers_saved_total", "kind" => "multiple_choice").increment(1);

    Ok(stored)
}

pub(crate) async fn submit_essay(
    store: &dyn Store,
    attempt_id: &str,
    question_id: &str,
    text: &str,
) -> Result<ExamAnswer, EngineError> {
    let attempt = load_attempt(store, attempt_id).await?;
    let question = load_question_for_attempt(store, &attempt, question_id).await?;

    if question.question_type != QuestionType::Essay {
        return Err(EngineError::Validation("Question does not accept essay text".to_string()));
    }
    if attempt.submitted {
        return Err(EngineError::AttemptClosed);
    }

    let answer = new_answer(&attempt.id, &question.id, None, Some(text.to_string()), None);
    let stored = store.save_answer(&answer).await?;
    metrics::counter!("exam_answers_saved_total", "kind" => "essay").increment(1);

    Ok(stored)
}

/// Scores and submits the attempt. A second call returns the recorded score without
/// rescoring.
pub(crate) async fn finish_exam(
    store: &dyn Store,
    attempt_id: &str,
) -> Result<ExamResult, EngineError> {
    let finished = store.finish_attempt(attempt_id, primitive_now_utc()).await?;
    let tally = scoring::score_answers(&finished.answers);
    let result = ExamResult { score: finished.attempt.score.unwrap_or(tally.score), ..tally };

    if finished.newly_finished {
        metrics::counter!("exam_attempts_finished_total").increment(1);
        tracing::info!(
            attempt_id,
            exam_id = %finished.attempt.exam_id,
            score = result.score,
            correct = result.correct_count,
            answered = result.total_questions,
            "Exam attempt finished"
        );
    }

    Ok(result)
}

fn group_options(options: Vec<QuestionOption>) -> HashMap<String, Vec<QuestionOption>> {
    let mut grouped: HashMap<String, Vec<QuestionOption>> = HashMap::new();
    for option in options {
        grouped.entry(option.question_id.clone()).or_default().push(option);
    }
    for list in grouped.values_mut() {
        list.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
    }
    grouped
}

/// Questions shown while taking the exam, capped at `limit` when randomized.
pub(crate) async fn questions_for_exam<R>(
    store: &dyn Store,
    exam_id: &str,
    limit: usize,
    rng: &mut R,
) -> Result<Vec<QuestionWithOptions>, EngineError>
where
    R: Rng + Send,
{
    let exam = store.find_exam(exam_id).await?.ok_or(EngineError::NotFound("Exam"))?;
    let questions = store.list_questions(exam_id).await?;
    if questions.is_empty() {
        return Err(EngineError::NotFound("Questions"));
    }

    let selected = select_questions(questions, exam.randomize_questions, limit, rng);
    let question_ids: Vec<String> = selected.iter().map(|question| question.id.clone()).collect();
    let mut options = group_options(store.list_options(&question_ids).await?);

    Ok(selected
        .into_iter()
        .map(|question| {
            let options = options.remove(&question.id).unwrap_or_default();
            QuestionWithOptions { question, options }
        })
        .collect())
}

pub(crate) async fn review_attempt(
    store: &dyn Store,
    attempt_id: &str,
) -> Result<AttemptReview, EngineError> {
    let attempt = load_attempt(store, attempt_id).await?;
    // Option correctness stays hidden while answers can still change.
    if !attempt.submitted {
        return Err(EngineError::AttemptOpen);
    }
    let exam = store.find_exam(&attempt.exam_id).await?.ok_or(EngineError::NotFound("Exam"))?;
    let answers = store.list_answers(&attempt.id).await?;

    let mut questions: HashMap<String, Question> = store
        .list_questions(&attempt.exam_id)
        .await?
        .into_iter()
        .map(|question| (question.id.clone(), question))
        .collect();
    let question_ids: Vec<String> = answers.iter().map(|answer| answer.question_id.clone()).collect();
    let mut options = group_options(store.list_options(&question_ids).await?);

    let mut items: Vec<ReviewItem> = answers
        .into_iter()
        .filter_map(|answer| {
            let question = questions.remove(&answer.question_id)?;
            let options = options.remove(&question.id).unwrap_or_default();
            Some(ReviewItem { question, options, answer })
        })
        .collect();
    items.sort_by_key(|item| item.question.order_index);

    Ok(AttemptReview { attempt, exam_title: exam.title, items })
}

pub(crate) async fn latest_attempt(
    store: &dyn Store,
    exam_id: &str,
    student_id: &str,
) -> Result<ExamAttempt, EngineError> {
    store.latest_attempt(exam_id, student_id).await?.ok_or(EngineError::NotFound("Attempt"))
}

pub(crate) async fn list_my_attempts(
    store: &dyn Store,
    student_id: &str,
    skip: i64,
    limit: i64,
) -> Result<(Vec<ExamAttempt>, i64), EngineError> {
    let skip = skip.max(0);
    let limit = limit.clamp(1, 1000);
    let items = store.list_attempts_by_student(student_id, skip, limit).await?;
    let total = store.count_attempts_by_student(student_id).await?;
    Ok((items, total))
}
