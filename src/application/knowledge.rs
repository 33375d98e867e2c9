//! Knowledge article operations. Same cache and pagination treatment as
//! posts, without denormalized counters.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::pagination::{CursorPage, PageRequest};
use crate::application::repos::{CreateKnowledgeParams, KnowledgeRepo, UpdateKnowledgeParams};
use crate::cache::{CacheKey, CacheService, Invalidator, Ttl};
use crate::domain::entities::KnowledgeRecord;

#[derive(Debug, Clone)]
pub struct CreateKnowledgeCommand {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateKnowledgeCommand {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Clone)]
pub struct KnowledgeService {
    repo: Arc<dyn KnowledgeRepo>,
    cache: CacheService,
    invalidator: Invalidator,
}

impl KnowledgeService {
    pub fn new(repo: Arc<dyn KnowledgeRepo>, cache: CacheService, invalidator: Invalidator) -> Self {
        Self {
            repo,
            cache,
            invalidator,
        }
    }

    pub async fn list(&self, page: PageRequest) -> Result<CursorPage<KnowledgeRecord>, AppError> {
        let key = CacheKey::knowledge_list(&page);
        if let Some(cached) = self.cache.get::<CursorPage<KnowledgeRecord>>(&key).await {
            return Ok(cached);
        }

        let articles = self.repo.list_articles(page).await?;
        self.cache.set(&key, &articles, Ttl::Medium).await;
        Ok(articles)
    }

    pub async fn get(&self, id: Uuid) -> Result<KnowledgeRecord, AppError> {
        let key = CacheKey::Knowledge { id };
        if let Some(cached) = self.cache.get::<KnowledgeRecord>(&key).await {
            return Ok(cached);
        }

        let article = self
            .repo
            .find_article(id)
            .await?
            .ok_or_else(|| AppError::not_found("knowledge article"))?;
        self.cache.set(&key, &article, Ttl::Long).await;
        Ok(article)
    }

    pub async fn create(&self, command: CreateKnowledgeCommand) -> Result<KnowledgeRecord, AppError> {
        if command.title.trim().is_empty() {
            return Err(AppError::validation("title is required"));
        }
        if command.content.trim().is_empty() {
            return Err(AppError::validation("content is required"));
        }

        let article = self
            .repo
            .create_article(CreateKnowledgeParams {
                title: command.title,
                content: command.content,
            })
            .await?;
        self.invalidator.knowledge_written().await;
        Ok(article)
    }

    pub async fn update(
        &self,
        id: Uuid,
        command: UpdateKnowledgeCommand,
    ) -> Result<KnowledgeRecord, AppError> {
        for (field, value) in [("title", &command.title), ("content", &command.content)] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(AppError::validation(format!("{field} must not be empty")));
            }
        }

        let article = self
            .repo
            .update_article(
                id,
                UpdateKnowledgeParams {
                    title: command.title,
                    content: command.content,
                },
            )
            .await?
            .ok_or_else(|| AppError::not_found("knowledge article"))?;
        self.invalidator.knowledge_written().await;
        Ok(article)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let deleted = self.repo.delete_article(id).await?;
        if !deleted {
            return Err(AppError::not_found("knowledge article"));
        }
        self.invalidator.knowledge_written().await;
        Ok(())
    }
}
