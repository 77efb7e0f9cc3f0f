use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Tables backing the profile, category, transaction and session stores.
/// Each statement is idempotent so startup can run them unconditionally.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS profile (
        id BIGSERIAL PRIMARY KEY,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT uk_profile_email UNIQUE (email)
    )",
    "CREATE TABLE IF NOT EXISTS category (
        id BIGSERIAL PRIMARY KEY,
        profile_id BIGINT NOT NULL,
        content TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        deleted_at TIMESTAMPTZ,
        CONSTRAINT uk_category_content_profile UNIQUE (content, profile_id)
    )",
    "CREATE TABLE IF NOT EXISTS transaction (
        id BIGSERIAL PRIMARY KEY,
        profile_id BIGINT NOT NULL,
        transaction_type TEXT NOT NULL,
        category_ids BIGINT[] NOT NULL,
        description TEXT NOT NULL,
        amount BIGINT NOT NULL CHECK (amount > 0),
        date TIMESTAMPTZ NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS idx_transaction_profile_date ON transaction (profile_id, date DESC)",
    "CREATE TABLE IF NOT EXISTS session (
        id TEXT PRIMARY KEY,
        profile_id BIGINT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        expires_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_session_expires_at ON session (expires_at)",
];

/// Connection pool bootstrap for the relational store
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool from configuration and make sure the schema exists
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        // Validate before handing to sqlx so a typo fails with a clear error
        let parsed = url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !matches!(parsed.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        Self::ensure_schema(&pool).await?;

        info!(
            "Connected database pool to {}:{}{} (max {} connections)",
            parsed.host_str().unwrap_or("localhost"),
            parsed.port().unwrap_or(5432),
            parsed.path(),
            config.max_connections
        );
        Ok(pool)
    }

    pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
