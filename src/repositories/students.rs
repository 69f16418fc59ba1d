use sqlx::PgPool;

use crate::db::models::{SchoolClass, Student};

const COLUMNS: &str = "id, user_id, student_code, class_id, created_at";

pub(crate) async fn find_by_user_id(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE user_id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_classes(pool: &PgPool) -> Result<Vec<SchoolClass>, sqlx::Error> {
    sqlx::query_as::<_, SchoolClass>("SELECT id, name, created_at FROM classes ORDER BY name, id")
        .fetch_all(pool)
        .await
}
