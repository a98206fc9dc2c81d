//! Schema management for the SQLite catalog.

use sqlx::SqlitePool;

/// The catalog schema, applied by `--migrate`.
pub const SCHEMA_SQL: &str = include_str!("../migrations/0001_init.sql");

/// Apply [`SCHEMA_SQL`] statement by statement.
pub async fn apply_schema(db: &SqlitePool) -> Result<usize, sqlx::Error> {
    let statements = SCHEMA_SQL
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::info!("Running {} migration statements...", statements.len());

    for stmt in &statements {
        tracing::debug!("Executing migration SQL: {}", stmt);
        sqlx::query(*stmt).execute(db).await?;
    }

    Ok(statements.len())
}
