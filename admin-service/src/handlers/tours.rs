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

/// List tours, newest first
pub async fn list_tours(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<TourSummary>>>, AppError> {
    let tours = state.catalog.list_tours().await?;
    Ok(Json(ApiResponse::success(tours)))
}

/// Create a tour
pub async fn create_tour(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTourRequest>,
) -> Result<Json<ApiResponse<Tour>>, AppError> {
    let tour = state.catalog.create_tour(req).await?;
    Ok(Json(ApiResponse::success(tour)))
}

/// Tour edit-screen payload: the tour plus its stops in play order
pub async fn get_tour(
    State(state): State<Arc<AppState>>,
    Path(tour_id): Path<Uuid>,
) -> Result<Json<ApiResponse<TourDetail>>, AppError> {
    let detail = state.catalog.get_tour_detail(tour_id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// Full-form tour save
pub async fn update_tour(
    State(state): State<Arc<AppState>>,
    Path(tour_id): Path<Uuid>,
    Json(req): Json<UpdateTourRequest>,
) -> Result<Json<ApiResponse<Tour>>, AppError> {
    let tour = state.catalog.update_tour(tour_id, req).await?;
    Ok(Json(ApiResponse::success(tour)))
}

/// Delete a tour and (via cascade) its stops
pub async fn delete_tour(
    State(state): State<Arc<AppState>>,
    Path(tour_id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    state.catalog.delete_tour(tour_id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Tour deleted",
    ))))
}
