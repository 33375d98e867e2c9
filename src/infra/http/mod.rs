//! HTTP surface: thin axum handlers over the application services.

mod categories;
mod comments;
mod error;
mod health;
mod knowledge;
mod posts;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use uuid::Uuid;

use crate::application::categories::CategoryService;
use crate::application::comments::CommentService;
use crate::application::knowledge::KnowledgeService;
use crate::application::pagination::{Cursor, PageRequest};
use crate::application::posts::PostService;
use crate::infra::kv::KeyValueBackend;

pub use error::ApiError;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub comments: CommentService,
    pub categories: CategoryService,
    pub knowledge: KnowledgeService,
    pub kv: Arc<dyn KeyValueBackend>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health::health))
        .route(
            "/api/posts",
            get(posts::list_posts).post(posts::create_post),
        )
        .route("/api/posts/dashboard", get(posts::dashboard))
        .route("/api/posts/home", get(posts::home))
        .route("/api/posts/search/{term}", get(posts::search_posts))
        .route(
            "/api/posts/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/api/posts/{id}/view", post(posts::increment_view))
        .route("/api/comments", post(comments::create_comment))
        .route(
            "/api/comments/{id}",
            get(comments::list_comments).delete(comments::delete_comment),
        )
        .route(
            "/api/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/api/categories/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            "/api/knowledges",
            get(knowledge::list_articles).post(knowledge::create_article),
        )
        .route(
            "/api/knowledges/{id}",
            get(knowledge::get_article)
                .put(knowledge::update_article)
                .delete(knowledge::delete_article),
        )
        .with_state(state)
}

async fn root() -> &'static str {
    "Vellum content API"
}

/// Assemble a page request from the shared cursor query parameters.
pub(crate) fn page_request(
    cursor: Option<&str>,
    id: Option<Uuid>,
    limit: Option<u32>,
) -> Result<PageRequest, ApiError> {
    let cursor = Cursor::from_params(cursor, id)
        .map_err(|err| ApiError::bad_request(err.to_string()))?;
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    Ok(PageRequest::new(limit, cursor))
}
