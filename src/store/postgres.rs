use async_trait::async_trait;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{
    Exam, ExamAnswer, ExamAttempt, FinalizedAttemptRow, Question, QuestionOption, SchoolClass,
    Student, User,
};
use crate::repositories;
use crate::services::scoring;
use crate::store::{
    AttemptStore, DirectoryStore, ExamStore, FinalizedAttemptFilter, FinishedAttempt,
    OpenedAttempt, QuestionWithOptions, Store, StoreError,
};

#[derive(Clone)]
pub(crate) struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert_question_rows(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    entry: &QuestionWithOptions,
) -> Result<(), sqlx::Error> {
    repositories::questions::create(&mut **tx, &entry.question).await?;
    for option in &entry.options {
        repositories::questions::create_option(&mut **tx, option).await?;
    }
    Ok(())
}

#[async_trait]
impl ExamStore for PgStore {
    async fn insert_exam(
        &self,
        exam: &Exam,
        questions: &[QuestionWithOptions],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        repositories::exams::create(&mut *tx, exam).await?;
        for entry in questions {
            insert_question_rows(&mut tx, entry).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn update_exam(&self, exam: &Exam) -> Result<(), StoreError> {
        repositories::exams::update(&self.pool, exam).await?;
        Ok(())
    }

    async fn delete_exam(&self, exam_id: &str) -> Result<bool, StoreError> {
        Ok(repositories::exams::delete_by_id(&self.pool, exam_id).await?)
    }

    async fn find_exam(&self, exam_id: &str) -> Result<Option<Exam>, StoreError> {
        Ok(repositories::exams::find_by_id(&self.pool, exam_id).await?)
    }

    async fn list_exams(&self, published_only: bool) -> Result<Vec<Exam>, StoreError> {
        Ok(repositories::exams::list(&self.pool, published_only).await?)
    }

    async fn insert_question(&self, question: &QuestionWithOptions) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        insert_question_rows(&mut tx, question).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn count_questions(&self, exam_id: &str) -> Result<i64, StoreError> {
        Ok(repositories::questions::count_by_exam(&self.pool, exam_id).await?)
    }

    async fn list_questions(&self, exam_id: &str) -> Result<Vec<Question>, StoreError> {
        Ok(repositories::questions::list_by_exam(&self.pool, exam_id).await?)
    }

    async fn list_options(
        &self,
        question_ids: &[String],
    ) -> Result<Vec<QuestionOption>, StoreError> {
        Ok(repositories::questions::list_options_by_questions(&self.pool, question_ids).await?)
    }

    async fn find_question(&self, question_id: &str) -> Result<Option<Question>, StoreError> {
        Ok(repositories::questions::find_by_id(&self.pool, question_id).await?)
    }

    async fn find_option(&self, option_id: &str) -> Result<Option<QuestionOption>, StoreError> {
        Ok(repositories::questions::find_option(&self.pool, option_id).await?)
    }
}

#[async_trait]
impl AttemptStore for PgStore {
    async fn open_attempt(&self, candidate: &ExamAttempt) -> Result<OpenedAttempt, StoreError> {
        let mut tx = self.pool.begin().await?;
        repositories::attempts::acquire_exam_student_lock(
            &mut *tx,
            &candidate.exam_id,
            &candidate.student_id,
        )
        .await?;

        let latest = repositories::attempts::find_latest(
            &mut *tx,
            &candidate.exam_id,
            &candidate.student_id,
        )
        .await?;

        if let Some(existing) = latest.filter(|attempt| !attempt.submitted) {
            tx.commit().await?;
            return Ok(OpenedAttempt { attempt: existing, created: false });
        }

        repositories::attempts::create(&mut *tx, candidate).await?;
        tx.commit().await?;

        Ok(OpenedAttempt { attempt: candidate.clone(), created: true })
    }

    async fn find_attempt(&self, attempt_id: &str) -> Result<Option<ExamAttempt>, StoreError> {
        Ok(repositories::attempts::find_by_id(&self.pool, attempt_id).await?)
    }

    async fn latest_attempt(
        &self,
        exam_id: &str,
        student_id: &str,
    ) -> Result<Option<ExamAttempt>, StoreError> {
        Ok(repositories::attempts::find_latest(&self.pool, exam_id, student_id).await?)
    }

    async fn list_attempts_by_student(
        &self,
        student_id: &str,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<ExamAttempt>, StoreError> {
        Ok(repositories::attempts::list_by_student(&self.pool, student_id, skip, limit).await?)
    }

    async fn count_attempts_by_student(&self, student_id: &str) -> Result<i64, StoreError> {
        Ok(repositories::attempts::count_by_student(&self.pool, student_id).await?)
    }

    async fn save_answer(&self, answer: &ExamAnswer) -> Result<ExamAnswer, StoreError> {
        let mut tx = self.pool.begin().await?;
        let attempt = repositories::attempts::lock_by_id(&mut *tx, &answer.attempt_id)
            .await?
            .ok_or_else(|| StoreError::AttemptNotFound(answer.attempt_id.clone()))?;

        if attempt.submitted {
            return Err(StoreError::AttemptClosed(attempt.id));
        }

        let stored = repositories::answers::upsert(&mut *tx, answer).await?;
        tx.commit().await?;
        Ok(stored)
    }

    async fn list_answers(&self, attempt_id: &str) -> Result<Vec<ExamAnswer>, StoreError> {
        Ok(repositories::answers::list_by_attempt(&self.pool, attempt_id).await?)
    }

    async fn finish_attempt(
        &self,
        attempt_id: &str,
        ended_at: PrimitiveDateTime,
    ) -> Result<FinishedAttempt, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut attempt = repositories::attempts::lock_by_id(&mut *tx, attempt_id)
            .await?
            .ok_or_else(|| StoreError::AttemptNotFound(attempt_id.to_string()))?;
        let answers = repositories::answers::list_by_attempt(&mut *tx, attempt_id).await?;

        if attempt.submitted {
            tx.commit().await?;
            return Ok(FinishedAttempt { attempt, answers, newly_finished: false });
        }

        let result = scoring::score_answers(&answers);
        repositories::attempts::mark_submitted(&mut *tx, attempt_id, result.score, ended_at)
            .await?;
        tx.commit().await?;

        attempt.submitted = true;
        attempt.score = Some(result.score);
        attempt.ended_at = Some(ended_at);

        Ok(FinishedAttempt { attempt, answers, newly_finished: true })
    }

    async fn list_finalized_attempts(
        &self,
        filter: &FinalizedAttemptFilter,
    ) -> Result<Vec<FinalizedAttemptRow>, StoreError> {
        Ok(repositories::attempts::list_finalized(
            &self.pool,
            filter.exam_id.as_deref(),
            filter.ended_after,
        )
        .await?)
    }
}

#[async_trait]
impl DirectoryStore for PgStore {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(repositories::users::find_by_id(&self.pool, user_id).await?)
    }

    async fn find_student_by_user(&self, user_id: &str) -> Result<Option<Student>, StoreError> {
        Ok(repositories::students::find_by_user_id(&self.pool, user_id).await?)
    }

    async fn list_classes(&self) -> Result<Vec<SchoolClass>, StoreError> {
        Ok(repositories::students::list_classes(&self.pool).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
