//! Category handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::application::categories::{CreateCategoryCommand, UpdateCategoryCommand};

use super::AppState;
use super::error::ApiError;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct CategoryCreateRequest {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct CategoryUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let categories = state.categories.list().await?;
    Ok(Json(categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.categories.get(id).await?;
    Ok(Json(category))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CategoryCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .categories
        .create(CreateCategoryCommand {
            name: payload.name,
            description: payload.description,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .categories
        .update(
            id,
            UpdateCategoryCommand {
                name: payload.name,
                description: payload.description,
            },
        )
        .await?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.categories.delete(id).await?;
    Ok(Json(json!({ "message": "Category deleted successfully" })))
}
