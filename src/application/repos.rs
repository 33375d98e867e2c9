//! Repository traits describing the document-store adapters.
//!
//! These traits are the only surface the application layer sees of the
//! store: filter-find with sort and limit, single lookups, mutate-and-return
//! updates, and aggregation. Counter mutations are expressed as atomic
//! adjustments so concurrent requests never lose updates.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{CursorPage, PageRequest, PaginationError};
use crate::domain::entities::{
    CategoryDigest, CategoryRecord, CommentRecord, DashboardStats, KnowledgeRecord, PostRecord,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("store timeout")]
    Timeout,
    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Filter for post listings. The category is matched case-insensitively;
/// `None` (or the `All` sentinel, normalized by the service) lists every
/// category.
#[derive(Debug, Clone, Default)]
pub struct PostQueryFilter {
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub public_id: i64,
    pub title: String,
    pub content: String,
    pub caption: String,
    pub category: String,
    pub tag: String,
    pub image: String,
    pub trivia: String,
}

/// Partial update; `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdatePostParams {
    pub title: Option<String>,
    pub content: Option<String>,
    pub caption: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub image: Option<String>,
    pub trivia: Option<String>,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn list_posts(
        &self,
        filter: &PostQueryFilter,
        page: PageRequest,
    ) -> Result<CursorPage<PostRecord>, RepoError>;

    async fn search_posts(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<CursorPage<PostRecord>, RepoError>;

    async fn find_by_public_id(&self, public_id: i64) -> Result<Option<PostRecord>, RepoError>;

    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    async fn update_post(
        &self,
        public_id: i64,
        params: UpdatePostParams,
    ) -> Result<Option<PostRecord>, RepoError>;

    async fn delete_post(&self, public_id: i64) -> Result<Option<PostRecord>, RepoError>;

    /// Atomically add one to the post's view counter. Returns false when no
    /// post carries the public id.
    async fn increment_views(&self, public_id: i64) -> Result<bool, RepoError>;

    /// Atomically adjust the denormalized comment counter. Returns false
    /// when no post carries the public id (the adjustment is a no-op).
    async fn adjust_comment_count(&self, public_id: i64, delta: i64) -> Result<bool, RepoError>;

    async fn dashboard_stats(&self) -> Result<DashboardStats, RepoError>;

    /// Latest `per_category` posts for every category, newest first.
    async fn home_digest(&self, per_category: u32) -> Result<Vec<CategoryDigest>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateCommentParams {
    pub post_id: i64,
    pub name: String,
    pub comment: String,
}

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    async fn list_for_post(
        &self,
        post_public_id: i64,
        page: PageRequest,
    ) -> Result<CursorPage<CommentRecord>, RepoError>;

    async fn create_comment(&self, params: CreateCommentParams)
    -> Result<CommentRecord, RepoError>;

    async fn find_comment(&self, id: Uuid) -> Result<Option<CommentRecord>, RepoError>;

    async fn delete_comment(&self, id: Uuid) -> Result<Option<CommentRecord>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateCategoryParams {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryParams {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[async_trait]
pub trait CategoriesRepo: Send + Sync {
    /// Full category list, newest first. Unpaginated: the set is small and
    /// cached under a single fixed key.
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError>;

    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError>;

    /// Case-insensitive name lookup, optionally excluding one id (used by
    /// rename duplicate checks).
    async fn find_by_name(
        &self,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<CategoryRecord>, RepoError>;

    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError>;

    async fn update_category(
        &self,
        id: Uuid,
        params: UpdateCategoryParams,
    ) -> Result<Option<CategoryRecord>, RepoError>;

    async fn delete_category(&self, id: Uuid) -> Result<bool, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateKnowledgeParams {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateKnowledgeParams {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[async_trait]
pub trait KnowledgeRepo: Send + Sync {
    async fn list_articles(&self, page: PageRequest)
    -> Result<CursorPage<KnowledgeRecord>, RepoError>;

    async fn find_article(&self, id: Uuid) -> Result<Option<KnowledgeRecord>, RepoError>;

    async fn create_article(
        &self,
        params: CreateKnowledgeParams,
    ) -> Result<KnowledgeRecord, RepoError>;

    async fn update_article(
        &self,
        id: Uuid,
        params: UpdateKnowledgeParams,
    ) -> Result<Option<KnowledgeRecord>, RepoError>;

    async fn delete_article(&self, id: Uuid) -> Result<bool, RepoError>;
}

/// Public ids derive from creation time in milliseconds.
pub fn public_id_from(created_at: OffsetDateTime) -> i64 {
    (created_at.unix_timestamp_nanos() / 1_000_000) as i64
}
