use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use shared::types::{ApiResponse, MessageResponse};

use crate::handlers::auth::AppError;
use crate::models::*;
use crate::AppState;

/// List all categories, alphabetically
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Category>>>, AppError> {
    let categories = state.catalog.list_categories().await?;
    Ok(Json(ApiResponse::success(categories)))
}

/// Create a category
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<Json<ApiResponse<Category>>, AppError> {
    let category = state.catalog.create_category(req).await?;
    Ok(Json(ApiResponse::success(category)))
}

/// Delete a category; refused while tours still reference it
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    state.catalog.delete_category(category_id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Category deleted",
    ))))
}
