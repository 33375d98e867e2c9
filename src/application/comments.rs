//! Comment operations.
//!
//! Comment writes carry a side effect on the owning post: the denormalized
//! `comment_count` is adjusted with an atomic store-side increment, never a
//! read-modify-write, so interleaved requests cannot lose updates.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::pagination::{CursorPage, PageRequest};
use crate::application::repos::{CommentsRepo, CreateCommentParams, PostsRepo};
use crate::cache::{CacheKey, CacheService, Invalidator, Ttl};
use crate::domain::entities::CommentRecord;

const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone)]
pub struct CreateCommentCommand {
    pub post_id: i64,
    pub name: Option<String>,
    pub comment: String,
}

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentsRepo>,
    posts: Arc<dyn PostsRepo>,
    cache: CacheService,
    invalidator: Invalidator,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentsRepo>,
        posts: Arc<dyn PostsRepo>,
        cache: CacheService,
        invalidator: Invalidator,
    ) -> Self {
        Self {
            comments,
            posts,
            cache,
            invalidator,
        }
    }

    pub async fn list_for_post(
        &self,
        post_public_id: i64,
        page: PageRequest,
    ) -> Result<CursorPage<CommentRecord>, AppError> {
        let key = CacheKey::comments(post_public_id, &page);
        if let Some(cached) = self.cache.get::<CursorPage<CommentRecord>>(&key).await {
            return Ok(cached);
        }

        let comments = self.comments.list_for_post(post_public_id, page).await?;
        self.cache.set(&key, &comments, Ttl::Medium).await;
        Ok(comments)
    }

    pub async fn create(&self, command: CreateCommentCommand) -> Result<CommentRecord, AppError> {
        if command.comment.trim().is_empty() {
            return Err(AppError::validation("comment is required"));
        }

        let name = command
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| ANONYMOUS.to_string());

        let comment = self
            .comments
            .create_comment(CreateCommentParams {
                post_id: command.post_id,
                name,
                comment: command.comment,
            })
            .await?;

        // No-op when the post is gone; the comment is accepted regardless,
        // matching the no-cascade ownership model.
        self.posts
            .adjust_comment_count(comment.post_id, 1)
            .await?;
        self.invalidator.comment_written(comment.post_id).await;
        Ok(comment)
    }

    pub async fn delete(&self, id: Uuid) -> Result<CommentRecord, AppError> {
        let comment = self
            .comments
            .delete_comment(id)
            .await?
            .ok_or_else(|| AppError::not_found("comment"))?;

        self.posts
            .adjust_comment_count(comment.post_id, -1)
            .await?;
        self.invalidator.comment_written(comment.post_id).await;
        Ok(comment)
    }
}
