//! Category operations.
//!
//! Category names are unique case-insensitively. The list is small and
//! near-static, so it caches under one fixed key with the longest TTL and
//! invalidation deletes exact keys instead of scanning a prefix.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::repos::{CategoriesRepo, CreateCategoryParams, UpdateCategoryParams};
use crate::cache::{CacheKey, CacheService, Invalidator, Ttl};
use crate::domain::entities::CategoryRecord;

#[derive(Debug, Clone)]
pub struct CreateCategoryCommand {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryCommand {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct CategoryService {
    repo: Arc<dyn CategoriesRepo>,
    cache: CacheService,
    invalidator: Invalidator,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoriesRepo>, cache: CacheService, invalidator: Invalidator) -> Self {
        Self {
            repo,
            cache,
            invalidator,
        }
    }

    pub async fn list(&self) -> Result<Vec<CategoryRecord>, AppError> {
        let key = CacheKey::Categories;
        if let Some(cached) = self.cache.get::<Vec<CategoryRecord>>(&key).await {
            return Ok(cached);
        }

        let categories = self.repo.list_categories().await?;
        self.cache.set(&key, &categories, Ttl::VeryLong).await;
        Ok(categories)
    }

    pub async fn get(&self, id: Uuid) -> Result<CategoryRecord, AppError> {
        let key = CacheKey::Category { id };
        if let Some(cached) = self.cache.get::<CategoryRecord>(&key).await {
            return Ok(cached);
        }

        let category = self
            .repo
            .find_category(id)
            .await?
            .ok_or_else(|| AppError::not_found("category"))?;
        self.cache.set(&key, &category, Ttl::Long).await;
        Ok(category)
    }

    pub async fn create(&self, command: CreateCategoryCommand) -> Result<CategoryRecord, AppError> {
        let name = command.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("name is required"));
        }

        if self.repo.find_by_name(&name, None).await?.is_some() {
            return Err(AppError::conflict("Category already exists"));
        }

        let category = self
            .repo
            .create_category(CreateCategoryParams {
                name,
                description: command.description,
            })
            .await?;
        self.invalidator.category_written(category.id).await;
        Ok(category)
    }

    pub async fn update(
        &self,
        id: Uuid,
        command: UpdateCategoryCommand,
    ) -> Result<CategoryRecord, AppError> {
        let name = match command.name {
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(AppError::validation("name must not be empty"));
                }
                if self.repo.find_by_name(&name, Some(id)).await?.is_some() {
                    return Err(AppError::conflict("Category name already exists"));
                }
                Some(name)
            }
            None => None,
        };

        let category = self
            .repo
            .update_category(
                id,
                UpdateCategoryParams {
                    name,
                    description: command.description,
                },
            )
            .await?
            .ok_or_else(|| AppError::not_found("category"))?;
        self.invalidator.category_written(id).await;
        Ok(category)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let deleted = self.repo.delete_category(id).await?;
        if !deleted {
            return Err(AppError::not_found("category"));
        }
        self.invalidator.category_written(id).await;
        Ok(())
    }
}
