use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::{ExamAttempt, FinalizedAttemptRow};

pub(crate) const COLUMNS: &str =
    "id, exam_id, student_id, started_at, ended_at, submitted, score, created_at";

/// Serializes open-or-resume for one (exam, student) pair until the transaction ends.
pub(crate) async fn acquire_exam_student_lock(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: &str,
    student_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(format!("exam_attempt:{exam_id}:{student_id}"))
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<ExamAttempt>, sqlx::Error> {
    sqlx::query_as::<_, ExamAttempt>(&format!("SELECT {COLUMNS} FROM exam_attempts WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn lock_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<ExamAttempt>, sqlx::Error> {
    sqlx::query_as::<_, ExamAttempt>(&format!(
        "SELECT {COLUMNS} FROM exam_attempts WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_latest(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: &str,
    student_id: &str,
) -> Result<Option<ExamAttempt>, sqlx::Error> {
    sqlx::query_as::<_, ExamAttempt>(&format!(
        "SELECT {COLUMNS} FROM exam_attempts \
         WHERE exam_id = $1 AND student_id = $2 \
         ORDER BY created_at DESC, id DESC \
         LIMIT 1"
    ))
    .bind(exam_id)
    .bind(student_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    attempt: &ExamAttempt,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO exam_attempts (
            id, exam_id, student_id, started_at, ended_at, submitted, score, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)",
    )
    .bind(&attempt.id)
    .bind(&attempt.exam_id)
    .bind(&attempt.student_id)
    .bind(attempt.started_at)
    .bind(attempt.ended_at)
    .bind(attempt.submitted)
    .bind(attempt.score)
    .bind(attempt.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn mark_submitted(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    score: i32,
    ended_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE exam_attempts SET submitted = TRUE, score = $1, ended_at = $2 WHERE id = $3",
    )
    .bind(score)
    .bind(ended_at)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn list_by_student(
    pool: &PgPool,
    student_id: &str,
    skip: i64,
    limit: i64,
) -> Result<Vec<ExamAttempt>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!(
        "SELECT {COLUMNS} FROM exam_attempts WHERE student_id = "
    ));
    builder.push_bind(student_id);
    builder.push(" ORDER BY created_at DESC, id DESC OFFSET ");
    builder.push_bind(skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<ExamAttempt>().fetch_all(pool).await
}

pub(crate) async fn count_by_student(pool: &PgPool, student_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM exam_attempts WHERE student_id = $1")
        .bind(student_id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn list_finalized(
    pool: &PgPool,
    exam_id: Option<&str>,
    ended_after: Option<PrimitiveDateTime>,
) -> Result<Vec<FinalizedAttemptRow>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT a.exam_id,
                a.student_id,
                u.username,
                u.full_name,
                s.class_id,
                COALESCE(a.score, 0) AS score,
                COALESCE(
                    e.total_points,
                    (SELECT COUNT(*) FROM questions q WHERE q.exam_id = e.id)::INTEGER * 10
                ) AS max_score
         FROM exam_attempts a
         JOIN exams e ON e.id = a.exam_id
         JOIN students s ON s.id = a.student_id
         JOIN users u ON u.id = s.user_id
         WHERE a.submitted AND a.ended_at IS NOT NULL",
    );

    if let Some(exam_id) = exam_id {
        builder.push(" AND a.exam_id = ");
        builder.push_bind(exam_id);
    }

    if let Some(ended_after) = ended_after {
        builder.push(" AND a.ended_at >= ");
        builder.push_bind(ended_after);
    }

    builder.push(" ORDER BY a.ended_at DESC, a.id");

    builder.build_query_as::<FinalizedAttemptRow>().fetch_all(pool).await
}
