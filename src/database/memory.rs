//! In-memory stores used when no `DATABASE_URL` is configured, and by tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::models::{
    Category, CategoryId, NewCategory, NewProfile, NewTransaction, Profile, ProfileId, Session,
    Transaction, TransactionFields, TransactionId,
};
use crate::database::repository::{
    CategoryRepository, ProfileRepository, SessionStore, StoreError, StoreResult,
    TransactionRepository,
};

/// Rows keyed by a monotonically assigned id
struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Default)]
pub struct MemoryProfileRepository {
    table: RwLock<Table<Profile>>,
}

impl MemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for MemoryProfileRepository {
    async fn create(&self, profile: NewProfile) -> StoreResult<Profile> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|p| p.email == profile.email) {
            return Err(StoreError::Conflict(format!("email '{}' already registered", profile.email)));
        }

        let now = Utc::now();
        let id = table.allocate_id();
        let row = Profile {
            id,
            email: profile.email,
            password_hash: profile.password_hash,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: ProfileId) -> StoreResult<Option<Profile>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Profile>> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|p| p.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        let table = self.table.read().await;
        Ok(table.rows.values().any(|p| p.email == email))
    }
}

#[derive(Default)]
pub struct MemoryCategoryRepository {
    table: RwLock<Table<Category>>,
}

impl MemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for MemoryCategoryRepository {
    async fn create(&self, category: NewCategory) -> StoreResult<Category> {
        let mut table = self.table.write().await;
        let duplicate = table
            .rows
            .values()
            .any(|c| c.profile_id == category.profile_id && c.content == category.content);
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "category '{}' already exists for profile {}",
                category.content, category.profile_id
            )));
        }

        let now = Utc::now();
        let id = table.allocate_id();
        let row = Category {
            id,
            profile_id: category.profile_id,
            content: category.content,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        table.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_content(&self, profile_id: ProfileId, content: &str) -> StoreResult<Option<Category>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|c| c.profile_id == profile_id && c.content == content)
            .cloned())
    }

    async fn list_by_profile(&self, profile_id: ProfileId) -> StoreResult<Vec<Category>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|c| c.profile_id == profile_id && !c.is_deleted())
            .cloned()
            .collect())
    }

    async fn restore(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|c| {
            c.deleted_at = None;
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn soft_delete(&self, id: CategoryId, at: DateTime<Utc>) -> StoreResult<bool> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id) {
            Some(c) if !c.is_deleted() => {
                c.deleted_at = Some(at);
                c.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryTransactionRepository {
    table: RwLock<Table<Transaction>>,
}

impl MemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionRepository for MemoryTransactionRepository {
    async fn create(&self, transaction: NewTransaction) -> StoreResult<Transaction> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        let id = table.allocate_id();
        let fields = transaction.fields;
        let row = Transaction {
            id,
            profile_id: transaction.profile_id,
            transaction_type: fields.transaction_type,
            category_ids: fields.category_ids,
            description: fields.description,
            amount: fields.amount,
            date: fields.date,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: TransactionId) -> StoreResult<Option<Transaction>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list_by_profile(&self, profile_id: ProfileId) -> StoreResult<Vec<Transaction>> {
        let table = self.table.read().await;
        let mut rows: Vec<Transaction> = table
            .rows
            .values()
            .filter(|t| t.profile_id == profile_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn update(&self, id: TransactionId, fields: TransactionFields) -> StoreResult<Option<Transaction>> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|t| {
            t.transaction_type = fields.transaction_type;
            t.category_ids = fields.category_ids;
            t.description = fields.description;
            t.amount = fields.amount;
            t.date = fields.date;
            t.updated_at = Utc::now();
            t.clone()
        }))
    }

    async fn delete(&self, id: TransactionId) -> StoreResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<BTreeMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: Session) -> StoreResult<Session> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(StoreError::Conflict("session id collision".to_string()));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn find(&self, id: &str) -> StoreResult<Option<Session>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn touch(&self, id: &str, expires_at: DateTime<Utc>) -> StoreResult<bool> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(session) => {
                session.expires_at = expires_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(self.sessions.write().await.remove(id).is_some())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        Ok((before - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn fields(date: DateTime<Utc>) -> TransactionFields {
        TransactionFields {
            transaction_type: "expense".to_string(),
            category_ids: vec![1],
            description: "lunch".to_string(),
            amount: 9000,
            date,
        }
    }

    #[tokio::test]
    async fn profile_email_is_unique() {
        let repo = MemoryProfileRepository::new();
        let new = NewProfile { email: "a@b.com".to_string(), password_hash: "h".to_string() };
        let created = repo.create(new.clone()).await.unwrap();
        assert_eq!(created.id, 1);
        assert!(matches!(repo.create(new).await, Err(StoreError::Conflict(_))));
        assert!(repo.exists_by_email("a@b.com").await.unwrap());
        assert!(!repo.exists_by_email("A@b.com").await.unwrap());
    }

    #[tokio::test]
    async fn category_pair_is_unique_even_when_deleted() {
        let repo = MemoryCategoryRepository::new();
        let new = NewCategory { profile_id: 7, content: "식비".to_string() };
        let created = repo.create(new.clone()).await.unwrap();
        assert!(repo.soft_delete(created.id, Utc::now()).await.unwrap());
        assert!(matches!(repo.create(new).await, Err(StoreError::Conflict(_))));

        // another profile may use the same content
        let other = NewCategory { profile_id: 8, content: "식비".to_string() };
        assert!(repo.create(other).await.is_ok());
    }

    #[tokio::test]
    async fn soft_deleted_categories_are_hidden_from_listing() {
        let repo = MemoryCategoryRepository::new();
        let a = repo.create(NewCategory { profile_id: 1, content: "a".to_string() }).await.unwrap();
        repo.create(NewCategory { profile_id: 1, content: "b".to_string() }).await.unwrap();
        repo.soft_delete(a.id, Utc::now()).await.unwrap();

        let listed: Vec<_> = repo.list_by_profile(1).await.unwrap().into_iter().map(|c| c.content).collect();
        assert_eq!(listed, vec!["b"]);
        assert!(!repo.soft_delete(a.id, Utc::now()).await.unwrap());

        let restored = repo.restore(a.id).await.unwrap().unwrap();
        assert!(!restored.is_deleted());
    }

    #[tokio::test]
    async fn transactions_list_newest_first() {
        let repo = MemoryTransactionRepository::new();
        let now = Utc::now();
        let old = repo
            .create(NewTransaction { profile_id: 1, fields: fields(now - Duration::days(2)) })
            .await
            .unwrap();
        let new = repo
            .create(NewTransaction { profile_id: 1, fields: fields(now) })
            .await
            .unwrap();
        repo.create(NewTransaction { profile_id: 2, fields: fields(now) }).await.unwrap();

        let ids: Vec<_> = repo.list_by_profile(1).await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![new.id, old.id]);
        assert!(repo.delete(old.id).await.unwrap());
        assert!(!repo.delete(old.id).await.unwrap());
    }

    #[tokio::test]
    async fn session_touch_and_delete() {
        let store = MemorySessionStore::new();
        let now = Utc::now();
        let session = Session {
            id: "abc".to_string(),
            profile_id: 3,
            created_at: now,
            expires_at: now + Duration::minutes(5),
        };
        store.create(session).await.unwrap();

        let later = now + Duration::minutes(30);
        assert!(store.touch("abc", later).await.unwrap());
        assert_eq!(store.find("abc").await.unwrap().map(|s| s.expires_at), Some(later));
        assert!(store.delete("abc").await.unwrap());
        assert!(store.find("abc").await.unwrap().is_none());
        assert!(!store.touch("abc", later).await.unwrap());
    }

    #[tokio::test]
    async fn purge_drops_only_expired_sessions() {
        let store = MemorySessionStore::new();
        let now = Utc::now();
        for (id, offset) in [("old", -10), ("edge", 0), ("live", 10)] {
            store
                .create(Session {
                    id: id.to_string(),
                    profile_id: 1,
                    created_at: now - Duration::minutes(30),
                    expires_at: now + Duration::minutes(offset),
                })
                .await
                .unwrap();
        }

        assert_eq!(store.purge_expired(now).await.unwrap(), 2);
        assert!(store.find("old").await.unwrap().is_none());
        assert!(store.find("edge").await.unwrap().is_none());
        assert!(store.find("live").await.unwrap().is_some());
        assert_eq!(store.purge_expired(now).await.unwrap(), 0);
    }
}
