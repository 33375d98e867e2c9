//! Knowledge article handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::application::knowledge::{CreateKnowledgeCommand, UpdateKnowledgeCommand};

use super::error::ApiError;
use super::{AppState, page_request};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub cursor: Option<String>,
    pub id: Option<Uuid>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct KnowledgeCreateRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct KnowledgeUpdateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(query.cursor.as_deref(), query.id, query.limit)?;
    let articles = state.knowledge.list(page).await?;
    Ok(Json(articles))
}

pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let article = state.knowledge.get(id).await?;
    Ok(Json(article))
}

pub async fn create_article(
    State(state): State<AppState>,
    Json(payload): Json<KnowledgeCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let article = state
        .knowledge
        .create(CreateKnowledgeCommand {
            title: payload.title,
            content: payload.content,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(article)))
}

pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<KnowledgeUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let article = state
        .knowledge
        .update(
            id,
            UpdateKnowledgeCommand {
                title: payload.title,
                content: payload.content,
            },
        )
        .await?;
    Ok(Json(article))
}

pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.knowledge.delete(id).await?;
    Ok(Json(
        json!({ "message": "Knowledge article deleted successfully" }),
    ))
}
