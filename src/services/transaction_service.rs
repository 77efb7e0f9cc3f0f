use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidationErrors};

use crate::database::models::{
    CategoryId, NewTransaction, ProfileId, Transaction, TransactionFields, TransactionId,
};
use crate::database::TransactionRepository;

use super::category_service::{CategoryService, CategorySummary};
use super::{checked, field_error, trimmed, ServiceError, ServiceResult};

/// Create/edit payload for a transaction
///
/// ```json
/// {
///   "type": "expense",
///   "categoryIds": [1, 2],
///   "description": "점심",
///   "amount": 9000,
///   "date": "2024-05-01T12:00:00.000Z"
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransactionCreateRequest {
    #[serde(rename = "type")]
    #[validate(required(message = "거래 타입은 필수입니다"))]
    pub transaction_type: Option<String>,

    #[serde(rename = "categoryIds")]
    #[validate(
        required(message = "카테고리 ID는 필수입니다"),
        length(min = 1, message = "카테고리 ID는 필수입니다")
    )]
    pub category_ids: Option<Vec<CategoryId>>,

    #[validate(required(message = "설명은 필수입니다"))]
    pub description: Option<String>,

    #[validate(
        required(message = "금액은 필수입니다"),
        range(min = 1, message = "금액은 양수여야 합니다")
    )]
    pub amount: Option<i64>,

    /// ISO-8601; a missing offset is read as UTC
    #[validate(required(message = "날짜는 필수입니다"))]
    pub date: Option<String>,
}

impl TransactionCreateRequest {
    /// Text is trimmed and category ids deduplicated. Field checks and the
    /// date format are reported together.
    pub fn into_fields(self) -> ServiceResult<TransactionFields> {
        let request = Self {
            transaction_type: trimmed(self.transaction_type),
            category_ids: self.category_ids,
            description: trimmed(self.description),
            amount: self.amount,
            date: trimmed(self.date),
        };

        let mut errors = request.validate().err().unwrap_or_else(ValidationErrors::new);
        let date = request.date.as_deref().map(parse_timestamp);
        if let Some(None) = date {
            errors.add("date", field_error("format", "날짜 형식이 올바르지 않습니다"));
        }
        if !errors.errors().is_empty() {
            return Err(errors.into());
        }

        Ok(TransactionFields {
            transaction_type: checked("type", request.transaction_type)?,
            category_ids: dedup_preserving_order(checked("categoryIds", request.category_ids)?),
            description: checked("description", request.description)?,
            amount: checked("amount", request.amount)?,
            date: checked("date", date.flatten())?,
        })
    }
}

fn dedup_preserving_order(ids: Vec<CategoryId>) -> Vec<CategoryId> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

/// RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.fff]` / `YYYY-MM-DD` taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: TransactionId,
    pub transaction_type: String,
    pub categories: Vec<CategorySummary>,
    pub description: String,
    pub amount: i64,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransactionView {
    fn new(transaction: Transaction, categories: Vec<CategorySummary>) -> Self {
        Self {
            id: transaction.id,
            transaction_type: transaction.transaction_type,
            categories,
            description: transaction.description,
            amount: transaction.amount,
            date: transaction.date,
            created_at: transaction.created_at,
            updated_at: transaction.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionList {
    pub transactions: Vec<TransactionView>,
}

#[derive(Clone)]
pub struct TransactionService {
    transactions: Arc<dyn TransactionRepository>,
    categories: CategoryService,
}

impl TransactionService {
    pub fn new(transactions: Arc<dyn TransactionRepository>, categories: CategoryService) -> Self {
        Self { transactions, categories }
    }

    pub async fn create(&self, profile_id: ProfileId, request: TransactionCreateRequest) -> ServiceResult<TransactionView> {
        let fields = request.into_fields()?;
        let categories = self.categories.resolve_owned(profile_id, &fields.category_ids).await?;

        let transaction = self
            .transactions
            .create(NewTransaction { profile_id, fields })
            .await?;

        tracing::info!("Created transaction {} for profile {}", transaction.id, profile_id);
        Ok(TransactionView::new(
            transaction,
            categories.into_iter().map(CategorySummary::from).collect(),
        ))
    }

    pub async fn list(&self, profile_id: ProfileId) -> ServiceResult<TransactionList> {
        let rows = self.transactions.list_by_profile(profile_id).await?;
        let mut transactions = Vec::with_capacity(rows.len());
        for transaction in rows {
            let categories = self.categories.summaries(&transaction.category_ids).await?;
            transactions.push(TransactionView::new(transaction, categories));
        }
        Ok(TransactionList { transactions })
    }

    pub async fn update(
        &self,
        profile_id: ProfileId,
        transaction_id: TransactionId,
        request: TransactionCreateRequest,
    ) -> ServiceResult<TransactionView> {
        self.owned(profile_id, transaction_id).await?;

        let fields = request.into_fields()?;
        let categories = self.categories.resolve_owned(profile_id, &fields.category_ids).await?;

        let transaction = self
            .transactions
            .update(transaction_id, fields)
            .await?
            .ok_or_else(|| transaction_not_found(transaction_id))?;

        Ok(TransactionView::new(
            transaction,
            categories.into_iter().map(CategorySummary::from).collect(),
        ))
    }

    pub async fn delete(&self, profile_id: ProfileId, transaction_id: TransactionId) -> ServiceResult<()> {
        self.owned(profile_id, transaction_id).await?;
        if !self.transactions.delete(transaction_id).await? {
            return Err(transaction_not_found(transaction_id));
        }
        tracing::info!("Deleted transaction {} for profile {}", transaction_id, profile_id);
        Ok(())
    }

    /// Foreign transactions read as not found
    async fn owned(&self, profile_id: ProfileId, transaction_id: TransactionId) -> ServiceResult<Transaction> {
        match self.transactions.get(transaction_id).await? {
            Some(t) if t.profile_id == profile_id => Ok(t),
            _ => Err(transaction_not_found(transaction_id)),
        }
    }
}

fn transaction_not_found(id: TransactionId) -> ServiceError {
    ServiceError::not_found(format!("Transaction {} not found", id))
}
