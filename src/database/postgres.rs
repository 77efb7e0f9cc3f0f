//! Postgres-backed stores (sqlx, runtime-checked queries)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::models::{
    Category, CategoryId, NewCategory, NewProfile, NewTransaction, Profile, ProfileId, Session,
    Transaction, TransactionFields, TransactionId,
};
use crate::database::repository::{
    CategoryRepository, ProfileRepository, SessionStore, StoreError, StoreResult,
    TransactionRepository,
};

/// Translate unique violations into `StoreError::Conflict`
fn map_write_error(err: sqlx::Error, conflict: impl FnOnce() -> String) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Conflict(conflict()),
        sqlx::Error::PoolTimedOut => StoreError::Unavailable("connection pool timed out".to_string()),
        other => StoreError::Sqlx(other),
    }
}

fn map_read_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut => StoreError::Unavailable("connection pool timed out".to_string()),
        other => StoreError::Sqlx(other),
    }
}

const PROFILE_COLUMNS: &str = "id, email, password_hash, created_at, updated_at";
const CATEGORY_COLUMNS: &str = "id, profile_id, content, created_at, updated_at, deleted_at";
const TRANSACTION_COLUMNS: &str =
    "id, profile_id, transaction_type, category_ids, description, amount, date, created_at, updated_at";
const SESSION_COLUMNS: &str = "id, profile_id, created_at, expires_at";

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn create(&self, profile: NewProfile) -> StoreResult<Profile> {
        let sql = format!(
            "INSERT INTO profile (email, password_hash) VALUES ($1, $2) RETURNING {}",
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(&profile.email)
            .bind(&profile.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, || format!("email '{}' already registered", profile.email)))
    }

    async fn get(&self, id: ProfileId) -> StoreResult<Option<Profile>> {
        let sql = format!("SELECT {} FROM profile WHERE id = $1", PROFILE_COLUMNS);
        sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Profile>> {
        let sql = format!("SELECT {} FROM profile WHERE email = $1", PROFILE_COLUMNS);
        sqlx::query_as::<_, Profile>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM profile WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(map_read_error)
    }
}

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, category: NewCategory) -> StoreResult<Category> {
        let sql = format!(
            "INSERT INTO category (profile_id, content) VALUES ($1, $2) RETURNING {}",
            CATEGORY_COLUMNS
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(category.profile_id)
            .bind(&category.content)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_write_error(e, || {
                    format!(
                        "category '{}' already exists for profile {}",
                        category.content, category.profile_id
                    )
                })
            })
    }

    async fn get(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        let sql = format!("SELECT {} FROM category WHERE id = $1", CATEGORY_COLUMNS);
        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn find_by_content(&self, profile_id: ProfileId, content: &str) -> StoreResult<Option<Category>> {
        let sql = format!(
            "SELECT {} FROM category WHERE profile_id = $1 AND content = $2",
            CATEGORY_COLUMNS
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(profile_id)
            .bind(content)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn list_by_profile(&self, profile_id: ProfileId) -> StoreResult<Vec<Category>> {
        let sql = format!(
            "SELECT {} FROM category WHERE profile_id = $1 AND deleted_at IS NULL ORDER BY id",
            CATEGORY_COLUMNS
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(profile_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn restore(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        let sql = format!(
            "UPDATE category SET deleted_at = NULL, updated_at = now() WHERE id = $1 RETURNING {}",
            CATEGORY_COLUMNS
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn soft_delete(&self, id: CategoryId, at: DateTime<Utc>) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE category SET deleted_at = $2, updated_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_read_error)?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct PgTransactionRepository {
    pool: PgPool,
}

impl PgTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PgTransactionRepository {
    async fn create(&self, transaction: NewTransaction) -> StoreResult<Transaction> {
        let sql = format!(
            "INSERT INTO transaction (profile_id, transaction_type, category_ids, description, amount, date)
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            TRANSACTION_COLUMNS
        );
        let fields = transaction.fields;
        sqlx::query_as::<_, Transaction>(&sql)
            .bind(transaction.profile_id)
            .bind(&fields.transaction_type)
            .bind(&fields.category_ids)
            .bind(&fields.description)
            .bind(fields.amount)
            .bind(fields.date)
            .fetch_one(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn get(&self, id: TransactionId) -> StoreResult<Option<Transaction>> {
        let sql = format!("SELECT {} FROM transaction WHERE id = $1", TRANSACTION_COLUMNS);
        sqlx::query_as::<_, Transaction>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn list_by_profile(&self, profile_id: ProfileId) -> StoreResult<Vec<Transaction>> {
        let sql = format!(
            "SELECT {} FROM transaction WHERE profile_id = $1 ORDER BY date DESC, id DESC",
            TRANSACTION_COLUMNS
        );
        sqlx::query_as::<_, Transaction>(&sql)
            .bind(profile_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn update(&self, id: TransactionId, fields: TransactionFields) -> StoreResult<Option<Transaction>> {
        let sql = format!(
            "UPDATE transaction
             SET transaction_type = $2, category_ids = $3, description = $4, amount = $5, date = $6,
                 updated_at = now()
             WHERE id = $1 RETURNING {}",
            TRANSACTION_COLUMNS
        );
        sqlx::query_as::<_, Transaction>(&sql)
            .bind(id)
            .bind(&fields.transaction_type)
            .bind(&fields.category_ids)
            .bind(&fields.description)
            .bind(fields.amount)
            .bind(fields.date)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn delete(&self, id: TransactionId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM transaction WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_read_error)?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, session: Session) -> StoreResult<Session> {
        let sql = format!(
            "INSERT INTO session (id, profile_id, created_at, expires_at) VALUES ($1, $2, $3, $4) RETURNING {}",
            SESSION_COLUMNS
        );
        sqlx::query_as::<_, Session>(&sql)
            .bind(&session.id)
            .bind(session.profile_id)
            .bind(session.created_at)
            .bind(session.expires_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, || "session id collision".to_string()))
    }

    async fn find(&self, id: &str) -> StoreResult<Option<Session>> {
        let sql = format!("SELECT {} FROM session WHERE id = $1", SESSION_COLUMNS);
        sqlx::query_as::<_, Session>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn touch(&self, id: &str, expires_at: DateTime<Utc>) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE session SET expires_at = $2 WHERE id = $1")
            .bind(id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(map_read_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM session WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_read_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM session WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_read_error)?;
        Ok(result.rows_affected())
    }
}
