//! Database schema management for `airfleet-ingest`.
//!
//! Ensures the readings table and its time index exist before serving
//! requests. Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

use crate::registry;

// ---

/// `CREATE TABLE` statement for the readings table.
///
/// One nullable column per registry field, in registry order, so partial
/// readings leave the columns they did not carry as NULL.
fn create_table_sql(table: &str) -> String {
    // ---
    let columns: Vec<String> = registry::entries()
        .iter()
        .map(|spec| format!("    {:<5} {}", spec.name, spec.sql_type.to_uppercase()))
        .collect();

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    id    BIGSERIAL PRIMARY KEY,\n{}\n);",
        table,
        columns.join(",\n")
    )
}

/// Create the readings table and index (idempotent).
///
/// `table` must already be validated as a plain identifier. Safe to call on
/// every startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool, table: &str) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(&create_table_sql(table))
        .execute(&mut *tx)
        .await?;

    // The levels query scans a trailing 24h window
    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_time ON {table} (time);"
    ))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
