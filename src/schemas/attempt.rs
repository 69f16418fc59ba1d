use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{ExamAnswer, ExamAttempt};
use crate::db::types::QuestionType;
use crate::schemas::exam::OptionResponse;
use crate::services::attempt_engine::{AttemptReview, ReviewItem};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AnswerSubmit {
    #[serde(alias = "questionId")]
    #[validate(length(min = 1, message = "question_id must not be empty"))]
    pub(crate) question_id: String,
    #[serde(alias = "optionId")]
    #[validate(length(min = 1, message = "option_id must not be empty"))]
    pub(crate) option_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct EssaySubmit {
    #[serde(alias = "questionId")]
    #[validate(length(min = 1, message = "question_id must not be empty"))]
    pub(crate) question_id: String,
    #[validate(length(min = 1, max = 20000, message = "text must be 1-20000 characters"))]
    pub(crate) text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptResponse {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) student_id: String,
    pub(crate) started_at: String,
    pub(crate) ended_at: Option<String>,
    pub(crate) submitted: bool,
    pub(crate) score: Option<i32>,
    pub(crate) created_at: String,
}

impl From<ExamAttempt> for AttemptResponse {
    fn from(attempt: ExamAttempt) -> Self {
        Self {
            id: attempt.id,
            exam_id: attempt.exam_id,
            student_id: attempt.student_id,
            started_at: format_primitive(attempt.started_at),
            ended_at: attempt.ended_at.map(format_primitive),
            submitted: attempt.submitted,
            score: attempt.score,
            created_at: format_primitive(attempt.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StartAttemptResponse {
    #[serde(flatten)]
    pub(crate) attempt: AttemptResponse,
    pub(crate) resumed: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerResponse {
    pub(crate) id: String,
    pub(crate) attempt_id: String,
    pub(crate) question_id: String,
    pub(crate) selected_option_id: Option<String>,
    pub(crate) essay_text: Option<String>,
    pub(crate) updated_at: String,
}

impl From<ExamAnswer> for AnswerResponse {
    fn from(answer: ExamAnswer) -> Self {
        Self {
            id: answer.id,
            attempt_id: answer.attempt_id,
            question_id: answer.question_id,
            selected_option_id: answer.selected_option_id,
            essay_text: answer.essay_text,
            updated_at: format_primitive(answer.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewItemResponse {
    pub(crate) question_id: String,
    pub(crate) content: String,
    pub(crate) question_type: QuestionType,
    pub(crate) options: Vec<OptionResponse>,
    pub(crate) selected_option_id: Option<String>,
    pub(crate) essay_text: Option<String>,
    pub(crate) is_correct: Option<bool>,
}

impl From<ReviewItem> for ReviewItemResponse {
    fn from(item: ReviewItem) -> Self {
        let ReviewItem { question, options, answer } = item;
        Self {
            question_id: question.id,
            content: question.content,
            question_type: question.question_type,
            options: options.into_iter().map(OptionResponse::from).collect(),
            selected_option_id: answer.selected_option_id,
            essay_text: answer.essay_text,
            is_correct: answer.is_correct,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewResponse {
    pub(crate) attempt_id: String,
    pub(crate) exam_id: String,
    pub(crate) exam_title: String,
    pub(crate) score: Option<i32>,
    pub(crate) submitted: bool,
    pub(crate) items: Vec<ReviewItemResponse>,
}

impl From<AttemptReview> for ReviewResponse {
    fn from(review: AttemptReview) -> Self {
        Self {
            attempt_id: review.attempt.id,
            exam_id: review.attempt.exam_id,
            exam_title: review.exam_title,
            score: review.attempt.score,
            submitted: review.attempt.submitted,
            items: review.items.into_iter().map(ReviewItemResponse::from).collect(),
        }
    }
}
