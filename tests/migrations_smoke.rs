use sqlx::Row;

/// Integration runs need a real Postgres; without `DATABASE_URL` the test is a no-op.
fn database_url() -> Option<String> {
    dotenvy::dotenv().ok();

    std::env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty())
}

#[tokio::test]
async fn migrations_apply_and_tables_exist() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        eprintln!("DATABASE_URL is not set; skipping migrations smoke test");
        return Ok(());
    };

    let pool =
        sqlx::postgres::PgPoolOptions::new().max_connections(1).connect(&database_url).await?;

    let migrations_dir =
        std::env::var("QUIZHUB_MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string());
    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new(&migrations_dir)).await?;
    migrator.run(&pool).await?;

    let relations = [
        "users",
        "classes",
        "students",
        "exams",
        "questions",
        "question_options",
        "exam_attempts",
        "exam_answers",
        "ux_exam_attempts_open",
    ];

    for relation in relations {
        let row =
            sqlx::query("SELECT to_regclass($1)::text").bind(relation).fetch_one(&pool).await?;
        let regclass: Option<String> = row.try_get(0)?;
        assert!(regclass.is_some(), "expected {relation} to exist after migrations");
    }

    Ok(())
}
