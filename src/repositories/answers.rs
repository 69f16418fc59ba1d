use crate::db::models::ExamAnswer;

pub(crate) const COLUMNS: &str = "\
    id, attempt_id, question_id, selected_option_id, essay_text, is_correct, \
    created_at, updated_at";

/// Insert-or-replace keyed by `(attempt_id, question_id)`. The payload columns are
/// overwritten; the original id and `created_at` survive.
pub(crate) async fn upsert(
    executor: impl sqlx::PgExecutor<'_>,
    answer: &ExamAnswer,
) -> Result<ExamAnswer, sqlx::Error> {
    sqlx::query_as::<_, ExamAnswer>(&format!(
        "INSERT INTO exam_answers (
            id, attempt_id, question_id, selected_option_id, essay_text, is_correct,
            created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
        ON CONFLICT (attempt_id, question_id) DO UPDATE SET
            selected_option_id = EXCLUDED.selected_option_id,
            essay_text = EXCLUDED.essay_text,
            is_correct = EXCLUDED.is_correct,
            updated_at = EXCLUDED.updated_at
        RETURNING {COLUMNS}"
    ))
    .bind(&answer.id)
    .bind(&answer.attempt_id)
    .bind(&answer.question_id)
    .bind(&answer.selected_option_id)
    .bind(&answer.essay_text)
    .bind(answer.is_correct)
    .bind(answer.created_at)
    .bind(answer.updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_by_attempt(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: &str,
) -> Result<Vec<ExamAnswer>, sqlx::Error> {
    sqlx::query_as::<_, ExamAnswer>(&format!(
        "SELECT {COLUMNS} FROM exam_answers WHERE attempt_id = $1 ORDER BY created_at, id"
    ))
    .bind(attempt_id)
    .fetch_all(executor)
    .await
}
