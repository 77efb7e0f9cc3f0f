use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{CategoryId, ProfileId};

/// Spending category owned by one profile.
///
/// `(content, profile_id)` is unique across live and soft-deleted rows alike;
/// the timestamps are maintained by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub profile_id: ProfileId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Category {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_owned_by(&self, profile_id: ProfileId) -> bool {
        self.profile_id == profile_id
    }
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub profile_id: ProfileId,
    pub content: String,
}
