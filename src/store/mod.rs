//! Persistence seams consumed by the attempt engine and the HTTP layer.
//!
//! Entities reference each other by id only; every lookup goes through one of
//! these traits. `postgres::PgStore` is the production implementation.

pub(crate) mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use time::PrimitiveDateTime;

use crate::db::models::{
    Exam, ExamAnswer, ExamAttempt, FinalizedAttemptRow, Question, QuestionOption, SchoolClass,
    Student, User,
};

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("attempt {0} not found")]
    AttemptNotFound(String),
    #[error("attempt {0} is already submitted")]
    AttemptClosed(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub(crate) struct QuestionWithOptions {
    pub(crate) question: Question,
    pub(crate) options: Vec<QuestionOption>,
}

/// Result of an atomic open-or-resume on the (exam, student) attempt set.
#[derive(Debug, Clone)]
pub(crate) struct OpenedAttempt {
    pub(crate) attempt: ExamAttempt,
    pub(crate) created: bool,
}

/// Result of finalizing an attempt under its row lock.
#[derive(Debug, Clone)]
pub(crate) struct FinishedAttempt {
    pub(crate) attempt: ExamAttempt,
    pub(crate) answers: Vec<ExamAnswer>,
    /// `false` when the attempt had already been submitted before this call.
    pub(crate) newly_finished: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FinalizedAttemptFilter {
    pub(crate) exam_id: Option<String>,
    pub(crate) ended_after: Option<PrimitiveDateTime>,
}

#[async_trait]
pub(crate) trait ExamStore: Send + Sync {
    async fn insert_exam(
        &self,
        exam: &Exam,
        questions: &[QuestionWithOptions],
    ) -> Result<(), StoreError>;

    async fn update_exam(&self, exam: &Exam) -> Result<(), StoreError>;

    /// Deletes the exam with its questions, options, attempts and answers.
    async fn delete_exam(&self, exam_id: &str) -> Result<bool, StoreError>;

    async fn find_exam(&self, exam_id: &str) -> Result<Option<Exam>, StoreError>;

    /// Exams ordered newest first.
    async fn list_exams(&self, published_only: bool) -> Result<Vec<Exam>, StoreError>;

    async fn insert_question(&self, question: &QuestionWithOptions) -> Result<(), StoreError>;

    async fn count_questions(&self, exam_id: &str) -> Result<i64, StoreError>;

    /// Questions in persisted order: `order_index`, then creation time.
    async fn list_questions(&self, exam_id: &str) -> Result<Vec<Question>, StoreError>;

    /// Options for the given questions ordered by `position`.
    async fn list_options(&self, question_ids: &[String])
        -> Result<Vec<QuestionOption>, StoreError>;

    async fn find_question(&self, question_id: &str) -> Result<Option<Question>, StoreError>;

    async fn find_option(&self, option_id: &str) -> Result<Option<QuestionOption>, StoreError>;
}

#[async_trait]
pub(crate) trait AttemptStore: Send + Sync {
    /// Returns the latest attempt for the pair when it is still open, otherwise
    /// persists `candidate`. Serialized per (exam, student).
    async fn open_attempt(&self, candidate: &ExamAttempt) -> Result<OpenedAttempt, StoreError>;

    async fn find_attempt(&self, attempt_id: &str) -> Result<Option<ExamAttempt>, StoreError>;

    async fn latest_attempt(
        &self,
        exam_id: &str,
        student_id: &str,
    ) -> Result<Option<ExamAttempt>, StoreError>;

    async fn list_attempts_by_student(
        &self,
        student_id: &str,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<ExamAttempt>, StoreError>;

    async fn count_attempts_by_student(&self, student_id: &str) -> Result<i64, StoreError>;

    /// Inserts or replaces the answer for `(attempt_id, question_id)`. Fails with
    /// `AttemptClosed` once the attempt is submitted. Returns the stored row, which
    /// keeps the original id and `created_at` on replacement.
    async fn save_answer(&self, answer: &ExamAnswer) -> Result<ExamAnswer, StoreError>;

    async fn list_answers(&self, attempt_id: &str) -> Result<Vec<ExamAnswer>, StoreError>;

    /// Scores and submits the attempt while holding its lock. Already submitted
    /// attempts are returned unchanged.
    async fn finish_attempt(
        &self,
        attempt_id: &str,
        ended_at: PrimitiveDateTime,
    ) -> Result<FinishedAttempt, StoreError>;

    async fn list_finalized_attempts(
        &self,
        filter: &FinalizedAttemptFilter,
    ) -> Result<Vec<FinalizedAttemptRow>, StoreError>;
}

#[async_trait]
pub(crate) trait DirectoryStore: Send + Sync {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    async fn find_student_by_user(&self, user_id: &str) -> Result<Option<Student>, StoreError>;

    async fn list_classes(&self) -> Result<Vec<SchoolClass>, StoreError>;
}

#[async_trait]
pub(crate) trait Store: ExamStore + AttemptStore + DirectoryStore {
    async fn ping(&self) -> Result<(), StoreError>;
}
