//! Post handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::application::posts::{CreatePostCommand, UpdatePostCommand};

use super::error::ApiError;
use super::{AppState, page_request};

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub category: Option<String>,
    pub cursor: Option<String>,
    pub id: Option<Uuid>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub cursor: Option<String>,
    pub id: Option<Uuid>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PostCreateRequest {
    pub title: String,
    pub content: String,
    pub caption: String,
    pub category: String,
    pub tag: String,
    pub image: String,
    pub trivia: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PostUpdateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub caption: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub image: Option<String>,
    pub trivia: Option<String>,
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(query.cursor.as_deref(), query.id, query.limit)?;
    let posts = state.posts.list(query.category.as_deref(), page).await?;
    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.get(id).await?;
    Ok(Json(post))
}

pub async fn search_posts(
    State(state): State<AppState>,
    Path(term): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(query.cursor.as_deref(), query.id, query.limit)?;
    let posts = state.posts.search(&term, page).await?;
    Ok(Json(posts))
}

pub async fn dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.posts.dashboard().await?;
    Ok(Json(stats))
}

pub async fn home(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let digest = state.posts.home().await?;
    Ok(Json(digest))
}

pub async fn create_post(
    State(state): State<AppState>,
    Json(payload): Json<PostCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = CreatePostCommand {
        title: payload.title,
        content: payload.content,
        caption: payload.caption,
        category: payload.category,
        tag: payload.tag,
        image: payload.image,
        trivia: payload.trivia,
    };
    let post = state.posts.create(command).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PostUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = UpdatePostCommand {
        title: payload.title,
        content: payload.content,
        caption: payload.caption,
        category: payload.category,
        tag: payload.tag,
        image: payload.image,
        trivia: payload.trivia,
    };
    let post = state.posts.update(id, command).await?;
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.posts.delete(id).await?;
    Ok(Json(json!({ "message": "Post deleted successfully" })))
}

pub async fn increment_view(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.posts.increment_view(id).await?;
    Ok(StatusCode::OK)
}
