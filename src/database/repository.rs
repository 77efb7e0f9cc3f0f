use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::database::models::{
    Category, CategoryId, NewCategory, NewProfile, NewTransaction, Profile, ProfileId, Session,
    Transaction, TransactionFields, TransactionId,
};

/// Errors surfaced by the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fails with `StoreError::Conflict` when the email is taken
    async fn create(&self, profile: NewProfile) -> StoreResult<Profile>;

    async fn get(&self, id: ProfileId) -> StoreResult<Option<Profile>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Profile>>;

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Fails with `StoreError::Conflict` when `(content, profile_id)` exists,
    /// including soft-deleted rows
    async fn create(&self, category: NewCategory) -> StoreResult<Category>;

    /// Returns soft-deleted rows too
    async fn get(&self, id: CategoryId) -> StoreResult<Option<Category>>;

    /// Returns soft-deleted rows too
    async fn find_by_content(&self, profile_id: ProfileId, content: &str) -> StoreResult<Option<Category>>;

    /// Live categories of a profile, ordered by id
    async fn list_by_profile(&self, profile_id: ProfileId) -> StoreResult<Vec<Category>>;

    /// Clears `deleted_at`; `None` when the id is unknown
    async fn restore(&self, id: CategoryId) -> StoreResult<Option<Category>>;

    /// Sets `deleted_at`; false when the id is unknown or already deleted
    async fn soft_delete(&self, id: CategoryId, at: DateTime<Utc>) -> StoreResult<bool>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn create(&self, transaction: NewTransaction) -> StoreResult<Transaction>;

    async fn get(&self, id: TransactionId) -> StoreResult<Option<Transaction>>;

    /// Newest `date` first, ties broken by descending id
    async fn list_by_profile(&self, profile_id: ProfileId) -> StoreResult<Vec<Transaction>>;

    async fn update(&self, id: TransactionId, fields: TransactionFields) -> StoreResult<Option<Transaction>>;

    async fn delete(&self, id: TransactionId) -> StoreResult<bool>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, session: Session) -> StoreResult<Session>;

    /// Returns expired sessions too; callers decide on expiry
    async fn find(&self, id: &str) -> StoreResult<Option<Session>>;

    async fn touch(&self, id: &str, expires_at: DateTime<Utc>) -> StoreResult<bool>;

    async fn delete(&self, id: &str) -> StoreResult<bool>;

    /// Drops every session expiring at or before `now`; returns how many went
    async fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}
