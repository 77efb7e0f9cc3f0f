pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::DatabaseConfig;

pub use manager::{DatabaseError, DatabaseManager};
pub use repository::{
    CategoryRepository, ProfileRepository, SessionStore, StoreError, StoreResult,
    TransactionRepository,
};

/// Store handles shared by the services of one process
#[derive(Clone)]
pub struct Stores {
    pub profiles: Arc<dyn ProfileRepository>,
    pub sessions: Arc<dyn SessionStore>,
    pub categories: Arc<dyn CategoryRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
    pool: Option<PgPool>,
}

impl Stores {
    pub fn memory() -> Self {
        Self {
            profiles: Arc::new(memory::MemoryProfileRepository::new()),
            sessions: Arc::new(memory::MemorySessionStore::new()),
            categories: Arc::new(memory::MemoryCategoryRepository::new()),
            transactions: Arc::new(memory::MemoryTransactionRepository::new()),
            pool: None,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            profiles: Arc::new(postgres::PgProfileRepository::new(pool.clone())),
            sessions: Arc::new(postgres::PgSessionStore::new(pool.clone())),
            categories: Arc::new(postgres::PgCategoryRepository::new(pool.clone())),
            transactions: Arc::new(postgres::PgTransactionRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Postgres when a URL is configured, in-memory otherwise
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        if config.url.is_none() {
            tracing::warn!("DATABASE_URL not set; using in-memory stores (data is lost on restart)");
            return Ok(Self::memory());
        }
        let pool = DatabaseManager::connect(config).await?;
        Ok(Self::postgres(pool))
    }

    pub fn backend_name(&self) -> &'static str {
        if self.pool.is_some() { "postgres" } else { "memory" }
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        match &self.pool {
            Some(pool) => DatabaseManager::health_check(pool).await,
            None => Ok(()),
        }
    }
}
