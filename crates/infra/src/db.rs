//! Database adapters: connection pool and schema wiring.

use anyhow::Context;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::BillingConfig;

/// Schema applied by [`ensure_schema`]. Every statement is idempotent.
pub const SCHEMA_SQL: &str = include_str!("../migrations/0001_billing.sql");

/// Open a pool against `DATABASE_URL`.
pub async fn connect(config: &BillingConfig) -> anyhow::Result<PgPool> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is not set")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await
        .context("failed to connect to postgres")?;

    tracing::info!(max_connections = config.max_connections, "database pool ready");
    Ok(pool)
}

pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    tracing::info!("billing schema ensured");
    Ok(())
}

/// Postgres SQLSTATE of a database error, if any.
pub(crate) fn sqlstate(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|code| code.into_owned()),
        _ => None,
    }
}

/// Unique constraint violation (`23505`).
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    sqlstate(err).as_deref() == Some("23505")
}

/// Check constraint violation (`23514`).
pub(crate) fn is_check_violation(err: &sqlx::Error) -> bool {
    sqlstate(err).as_deref() == Some("23514")
}

pub(crate) fn describe(operation: &str, err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => {
            format!("database error in {operation}: {}", db_err.message())
        }
        sqlx::Error::PoolClosed => format!("connection pool closed in {operation}"),
        sqlx::Error::RowNotFound => format!("unexpected row not found in {operation}"),
        other => format!("sqlx error in {operation}: {other}"),
    }
}
