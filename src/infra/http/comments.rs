//! Comment handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::application::comments::CreateCommentCommand;

use super::error::ApiError;
use super::{AppState, page_request};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub cursor: Option<String>,
    pub id: Option<Uuid>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentCreateRequest {
    pub post_id: Option<i64>,
    pub name: Option<String>,
    pub comment: Option<String>,
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(query.cursor.as_deref(), query.id, query.limit)?;
    let comments = state.comments.list_for_post(post_id, page).await?;
    Ok(Json(comments))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Json(payload): Json<CommentCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(post_id), Some(comment)) = (payload.post_id, payload.comment) else {
        return Err(ApiError::bad_request("postId and comment are required"));
    };

    let created = state
        .comments
        .create(CreateCommentCommand {
            post_id,
            name: payload.name,
            comment,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.comments.delete(id).await?;
    Ok(Json(json!({ "message": "Comment deleted & count updated" })))
}
