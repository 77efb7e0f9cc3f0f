use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{CategoryId, ProfileId, TransactionId};

/// Stored income/expense entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: TransactionId,
    pub profile_id: ProfileId,
    pub transaction_type: String,
    pub category_ids: Vec<CategoryId>,
    pub description: String,
    pub amount: i64,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-settable fields, already validated
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFields {
    pub transaction_type: String,
    pub category_ids: Vec<CategoryId>,
    pub description: String,
    pub amount: i64,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub profile_id: ProfileId,
    pub fields: TransactionFields,
}
