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

/// List a tour's stops in play order
pub async fn list_stops(
    State(state): State<Arc<AppState>>,
    Path(tour_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Stop>>>, AppError> {
    let stops = state.catalog.list_stops(tour_id).await?;
    Ok(Json(ApiResponse::success(stops)))
}

/// Create a stop at the end of a tour's play order
pub async fn create_stop(
    State(state): State<Arc<AppState>>,
    Path(tour_id): Path<Uuid>,
    Json(req): Json<CreateStopRequest>,
) -> Result<Json<ApiResponse<Stop>>, AppError> {
    let stop = state.catalog.create_stop(tour_id, req).await?;
    Ok(Json(ApiResponse::success(stop)))
}

/// Full-form stop save
pub async fn update_stop(
    State(state): State<Arc<AppState>>,
    Path(stop_id): Path<Uuid>,
    Json(req): Json<UpdateStopRequest>,
) -> Result<Json<ApiResponse<Stop>>, AppError> {
    let stop = state.catalog.update_stop(stop_id, req).await?;
    Ok(Json(ApiResponse::success(stop)))
}

/// Delete a stop
pub async fn delete_stop(
    State(state): State<Arc<AppState>>,
    Path(stop_id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    state.catalog.delete_stop(stop_id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Stop deleted",
    ))))
}

/// Swap a stop with its neighbor in the given direction and return the
/// tour's stops in their new order
pub async fn move_stop(
    State(state): State<Arc<AppState>>,
    Path(stop_id): Path<Uuid>,
    Json(req): Json<MoveStopRequest>,
) -> Result<Json<ApiResponse<Vec<Stop>>>, AppError> {
    let stops = state.catalog.move_stop(stop_id, req.direction).await?;
    Ok(Json(ApiResponse::success(stops)))
}
