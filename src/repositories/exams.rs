use sqlx::PgPool;

use crate::db::models::Exam;
use crate::db::types::ExamLifecycle;

pub(crate) const COLUMNS: &str = "\
    id, title, description, start_time, end_time, duration_minutes, randomize_questions, \
    category, lifecycle, total_points, created_by, created_at, updated_at";

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn list(pool: &PgPool, published_only: bool) -> Result<Vec<Exam>, sqlx::Error> {
    if published_only {
        return sqlx::query_as::<_, Exam>(&format!(
            "SELECT {COLUMNS} FROM exams WHERE lifecycle = $1 ORDER BY created_at DESC, id"
        ))
        .bind(ExamLifecycle::Published)
        .fetch_all(pool)
        .await;
    }

    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams ORDER BY created_at DESC, id"))
        .fetch_all(pool)
        .await
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    exam: &Exam,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO exams (
            id, title, description, start_time, end_time, duration_minutes,
            randomize_questions, category, lifecycle, total_points, created_by,
            created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)",
    )
    .bind(&exam.id)
    .bind(&exam.title)
    .bind(&exam.description)
    .bind(exam.start_time)
    .bind(exam.end_time)
    .bind(exam.duration_minutes)
    .bind(exam.randomize_questions)
    .bind(&exam.category)
    .bind(exam.lifecycle)
    .bind(exam.total_points)
    .bind(&exam.created_by)
    .bind(exam.created_at)
    .bind(exam.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn update(pool: &PgPool, exam: &Exam) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE exams
         SET title = $1,
             description = $2,
             start_time = $3,
             end_time = $4,
             duration_minutes = $5,
             randomize_questions = $6,
             category = $7,
             lifecycle = $8,
             total_points = $9,
             updated_at = $10
         WHERE id = $11",
    )
    .bind(&exam.title)
    .bind(&exam.description)
    .bind(exam.start_time)
    .bind(exam.end_time)
    .bind(exam.duration_minutes)
    .bind(exam.randomize_questions)
    .bind(&exam.category)
    .bind(exam.lifecycle)
    .bind(exam.total_points)
    .bind(exam.updated_at)
    .bind(&exam.id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exams WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
