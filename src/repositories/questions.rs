use sqlx::PgPool;

use crate::db::models::{Question, QuestionOption};

pub(crate) const COLUMNS: &str =
    "id, exam_id, content, question_type, order_index, points, created_at";

pub(crate) const OPTION_COLUMNS: &str = "id, question_id, content, position, is_correct";

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    question: &Question,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO questions (
            id, exam_id, content, question_type, order_index, points, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)",
    )
    .bind(&question.id)
    .bind(&question.exam_id)
    .bind(&question.content)
    .bind(question.question_type)
    .bind(question.order_index)
    .bind(question.points)
    .bind(question.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn create_option(
    executor: impl sqlx::PgExecutor<'_>,
    option: &QuestionOption,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO question_options (id, question_id, content, position, is_correct)
         VALUES ($1,$2,$3,$4,$5)",
    )
    .bind(&option.id)
    .bind(&option.question_id)
    .bind(&option.content)
    .bind(option.position)
    .bind(option.is_correct)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn count_by_exam(pool: &PgPool, exam_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE exam_id = $1")
        .bind(exam_id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn list_by_exam(pool: &PgPool, exam_id: &str) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE exam_id = $1 ORDER BY order_index, created_at, id"
    ))
    .bind(exam_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_option(
    pool: &PgPool,
    id: &str,
) -> Result<Option<QuestionOption>, sqlx::Error> {
    sqlx::query_as::<_, QuestionOption>(&format!(
        "SELECT {OPTION_COLUMNS} FROM question_options WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_options_by_questions(
    pool: &PgPool,
    question_ids: &[String],
) -> Result<Vec<QuestionOption>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, QuestionOption>(&format!(
        "SELECT {OPTION_COLUMNS}
         FROM question_options
         WHERE question_id = ANY($1)
         ORDER BY question_id, position, id"
    ))
    .bind(question_ids)
    .fetch_all(pool)
    .await
}
