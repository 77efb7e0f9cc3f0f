use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::database::models::{Category, CategoryId, NewCategory, ProfileId};
use crate::database::{CategoryRepository, StoreError};

use super::{checked, trimmed, ServiceError, ServiceResult};

const DUPLICATE_CATEGORY: &str = "이미 존재하는 카테고리입니다";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CategoryCreateRequest {
    #[validate(required(message = "카테고리 이름은 필수입니다"))]
    pub content: Option<String>,
}

impl CategoryCreateRequest {
    /// Trimmed, non-blank content
    pub fn into_content(self) -> ServiceResult<String> {
        let request = Self { content: trimmed(self.content) };
        request.validate()?;
        Ok(checked("content", request.content)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: CategoryId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            content: category.content,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

/// Compact form embedded in transaction views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub content: String,
}

impl From<Category> for CategorySummary {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            content: category.content,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryList {
    pub categories: Vec<CategoryView>,
}

/// Per-profile categories with soft delete
#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    /// Creates the category, or revives a soft-deleted one with the same content
    pub async fn create(&self, profile_id: ProfileId, request: CategoryCreateRequest) -> ServiceResult<CategoryView> {
        let content = request.into_content()?;

        if let Some(existing) = self.categories.find_by_content(profile_id, &content).await? {
            if !existing.is_deleted() {
                return Err(ServiceError::business(DUPLICATE_CATEGORY));
            }
            let restored = self
                .categories
                .restore(existing.id)
                .await?
                .ok_or_else(|| ServiceError::not_found(format!("Category {} not found", existing.id)))?;
            tracing::info!("Restored category {} for profile {}", restored.id, profile_id);
            return Ok(restored.into());
        }

        match self.categories.create(NewCategory { profile_id, content }).await {
            Ok(category) => {
                tracing::info!("Created category {} for profile {}", category.id, profile_id);
                Ok(category.into())
            }
            Err(StoreError::Conflict(_)) => Err(ServiceError::business(DUPLICATE_CATEGORY)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list(&self, profile_id: ProfileId) -> ServiceResult<CategoryList> {
        let categories = self
            .categories
            .list_by_profile(profile_id)
            .await?
            .into_iter()
            .map(CategoryView::from)
            .collect();
        Ok(CategoryList { categories })
    }

    /// Soft delete; foreign and already-deleted categories read as not found
    pub async fn delete(&self, profile_id: ProfileId, category_id: CategoryId) -> ServiceResult<()> {
        self.owned_live(profile_id, category_id).await?;
        if !self.categories.soft_delete(category_id, Utc::now()).await? {
            return Err(ServiceError::not_found(format!("Category {} not found", category_id)));
        }
        Ok(())
    }

    /// Live categories owned by `profile_id`, in the order requested.
    /// Fails with a business error naming the first id that does not qualify.
    pub async fn resolve_owned(&self, profile_id: ProfileId, ids: &[CategoryId]) -> ServiceResult<Vec<Category>> {
        let mut resolved = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.categories.get(id).await? {
                Some(category) if category.is_owned_by(profile_id) && !category.is_deleted() => {
                    resolved.push(category)
                }
                _ => {
                    return Err(ServiceError::business(format!("존재하지 않는 카테고리입니다: {}", id)));
                }
            }
        }
        Ok(resolved)
    }

    /// Summaries for display; unknown ids are skipped and deleted ones kept
    pub async fn summaries(&self, ids: &[CategoryId]) -> ServiceResult<Vec<CategorySummary>> {
        let mut summaries = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(category) = self.categories.get(id).await? {
                summaries.push(category.into());
            }
        }
        Ok(summaries)
    }

    async fn owned_live(&self, profile_id: ProfileId, category_id: CategoryId) -> ServiceResult<Category> {
        match self.categories.get(category_id).await? {
            Some(category) if category.is_owned_by(profile_id) && !category.is_deleted() => Ok(category),
            _ => Err(ServiceError::not_found(format!("Category {} not found", category_id))),
        }
    }
}
