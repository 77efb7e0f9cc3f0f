use std::sync::Arc;

use crate::database::memory::{
    MemoryCategoryRepository, MemoryProfileRepository, MemorySessionStore, MemoryTransactionRepository,
};
use crate::database::SessionStore;
use crate::services::{CategoryService, ProfileService, ServiceError, TransactionService};

/// Profile service over fresh in-memory stores; the session store is returned for inspection
pub fn memory_profile_service(ttl_secs: u64) -> (ProfileService, Arc<dyn SessionStore>) {
    let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let service = ProfileService::new(Arc::new(MemoryProfileRepository::new()), sessions.clone(), ttl_secs);
    (service, sessions)
}

/// Category and transaction services sharing one in-memory category store
pub fn memory_transaction_services() -> (CategoryService, TransactionService) {
    let categories = CategoryService::new(Arc::new(MemoryCategoryRepository::new()));
    let transactions = TransactionService::new(Arc::new(MemoryTransactionRepository::new()), categories.clone());
    (categories, transactions)
}

/// First message reported for `field` when `err` is a validation failure
pub fn field_message(err: &ServiceError, field: &str) -> Option<String> {
    let ServiceError::Validation(errors) = err else {
        return None;
    };
    errors
        .field_errors()
        .get(field)
        .and_then(|list| list.first())
        .and_then(|error| error.message.as_ref())
        .map(|message| message.to_string())
}
