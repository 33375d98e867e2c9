//! Post operations: cache-aware reads, mutations with invalidation.
//!
//! Every read derives its cache key, checks the cache, and on a miss runs
//! the store query and writes the result back. Every write mutates the
//! store first and then applies the purge plan for its mutation class.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;

use crate::application::error::AppError;
use crate::application::pagination::{CursorPage, PageRequest};
use crate::application::repos::{
    CreatePostParams, PostQueryFilter, PostsRepo, UpdatePostParams, public_id_from,
};
use crate::cache::{CacheKey, CacheService, Invalidator, Ttl, normalize_category};
use crate::domain::entities::{DashboardStats, HomeDigest, PostRecord};

#[derive(Debug, Clone, Default)]
pub struct CreatePostCommand {
    pub title: String,
    pub content: String,
    pub caption: String,
    pub category: String,
    pub tag: String,
    pub image: String,
    pub trivia: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdatePostCommand {
    pub title: Option<String>,
    pub content: Option<String>,
    pub caption: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub image: Option<String>,
    pub trivia: Option<String>,
}

#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostsRepo>,
    cache: CacheService,
    invalidator: Invalidator,
    home_digest_size: u32,
}

impl PostService {
    pub fn new(
        repo: Arc<dyn PostsRepo>,
        cache: CacheService,
        invalidator: Invalidator,
        home_digest_size: u32,
    ) -> Self {
        Self {
            repo,
            cache,
            invalidator,
            home_digest_size,
        }
    }

    pub async fn list(
        &self,
        category: Option<&str>,
        page: PageRequest,
    ) -> Result<CursorPage<PostRecord>, AppError> {
        let key = CacheKey::post_list(category, &page);
        if let Some(cached) = self.cache.get::<CursorPage<PostRecord>>(&key).await {
            return Ok(cached);
        }

        let filter = PostQueryFilter {
            category: normalize_category(category),
        };
        let posts = self.repo.list_posts(&filter, page).await?;
        self.cache.set(&key, &posts, Ttl::Medium).await;
        Ok(posts)
    }

    pub async fn get(&self, public_id: i64) -> Result<PostRecord, AppError> {
        let key = CacheKey::post(public_id);
        if let Some(cached) = self.cache.get::<PostRecord>(&key).await {
            return Ok(cached);
        }

        let post = self
            .repo
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| AppError::not_found("post"))?;
        self.cache.set(&key, &post, Ttl::Long).await;
        Ok(post)
    }

    pub async fn search(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<CursorPage<PostRecord>, AppError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(AppError::validation("search term must not be empty"));
        }

        let key = CacheKey::search(term, &page);
        if let Some(cached) = self.cache.get::<CursorPage<PostRecord>>(&key).await {
            return Ok(cached);
        }

        let posts = self.repo.search_posts(term, page).await?;
        self.cache.set(&key, &posts, Ttl::Medium).await;
        Ok(posts)
    }

    pub async fn dashboard(&self) -> Result<DashboardStats, AppError> {
        let key = CacheKey::DashboardStats;
        if let Some(cached) = self.cache.get::<DashboardStats>(&key).await {
            return Ok(cached);
        }

        let stats = self.repo.dashboard_stats().await?;
        self.cache.set(&key, &stats, Ttl::Short).await;
        Ok(stats)
    }

    pub async fn home(&self) -> Result<HomeDigest, AppError> {
        let key = CacheKey::HomeDigest;
        if let Some(cached) = self.cache.get::<HomeDigest>(&key).await {
            return Ok(cached);
        }

        let categories = self.repo.home_digest(self.home_digest_size).await?;
        let digest = HomeDigest { categories };
        self.cache.set(&key, &digest, Ttl::Medium).await;
        Ok(digest)
    }

    pub async fn create(&self, command: CreatePostCommand) -> Result<PostRecord, AppError> {
        if command.title.trim().is_empty() {
            return Err(AppError::validation("title is required"));
        }
        if command.content.trim().is_empty() {
            return Err(AppError::validation("content is required"));
        }
        if command.category.trim().is_empty() {
            return Err(AppError::validation("category is required"));
        }

        let params = CreatePostParams {
            public_id: public_id_from(OffsetDateTime::now_utc()),
            title: command.title,
            content: command.content,
            caption: command.caption,
            category: command.category,
            tag: command.tag,
            image: command.image,
            trivia: command.trivia,
        };

        let post = self.repo.create_post(params).await?;
        self.invalidator.post_written(post.public_id).await;
        info!(public_id = post.public_id, "post created");
        Ok(post)
    }

    pub async fn update(
        &self,
        public_id: i64,
        command: UpdatePostCommand,
    ) -> Result<PostRecord, AppError> {
        for (field, value) in [
            ("title", &command.title),
            ("content", &command.content),
            ("category", &command.category),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(AppError::validation(format!("{field} must not be empty")));
            }
        }

        let params = UpdatePostParams {
            title: command.title,
            content: command.content,
            caption: command.caption,
            category: command.category,
            tag: command.tag,
            image: command.image,
            trivia: command.trivia,
        };

        let post = self
            .repo
            .update_post(public_id, params)
            .await?
            .ok_or_else(|| AppError::not_found("post"))?;
        self.invalidator.post_written(public_id).await;
        Ok(post)
    }

    pub async fn delete(&self, public_id: i64) -> Result<PostRecord, AppError> {
        let post = self
            .repo
            .delete_post(public_id)
            .await?
            .ok_or_else(|| AppError::not_found("post"))?;
        self.invalidator.post_written(public_id).await;
        info!(public_id, "post deleted");
        Ok(post)
    }

    pub async fn increment_view(&self, public_id: i64) -> Result<(), AppError> {
        let touched = self.repo.increment_views(public_id).await?;
        if !touched {
            return Err(AppError::not_found("post"));
        }
        self.invalidator.post_viewed(public_id).await;
        Ok(())
    }
}
