use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use shared::types::{ApiResponse, MessageResponse};

use crate::handlers::auth::AppError;
use crate::models::ButtonKey;
use crate::services::media::MediaSlot;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MediaUrlResponse {
    pub url: String,
}

/// The uploaded part of a multipart request.
struct UploadedFile {
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// Pull the `file` part out of a multipart body.
async fn read_upload(multipart: &mut Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") || field.file_name().is_some() {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;

            if data.is_empty() {
                return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
            }

            return Ok(UploadedFile {
                file_name,
                content_type,
                data: data.to_vec(),
            });
        }
    }

    Err(AppError::BadRequest(
        "Multipart field 'file' is required".to_string(),
    ))
}

async fn upload_slot(
    state: &AppState,
    slot: MediaSlot,
    owner_id: Uuid,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<MediaUrlResponse>>, AppError> {
    let upload = read_upload(&mut multipart).await?;

    let url = state
        .media
        .upload(
            slot,
            owner_id,
            upload.file_name.as_deref(),
            upload.content_type,
            upload.data,
        )
        .await?;

    Ok(Json(ApiResponse::success(MediaUrlResponse { url })))
}

async fn remove_slot(
    state: &AppState,
    slot: MediaSlot,
    owner_id: Uuid,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    state.media.remove(slot, owner_id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Media removed",
    ))))
}

// ============= Tour media =============

/// Upload a tour cover image
pub async fn upload_tour_cover(
    State(state): State<Arc<AppState>>,
    Path(tour_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<MediaUrlResponse>>, AppError> {
    upload_slot(&state, MediaSlot::TourCover, tour_id, multipart).await
}

/// Remove a tour cover image
pub async fn delete_tour_cover(
    State(state): State<Arc<AppState>>,
    Path(tour_id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    remove_slot(&state, MediaSlot::TourCover, tour_id).await
}

/// Upload one of the three call-to-action button images
pub async fn upload_tour_button(
    State(state): State<Arc<AppState>>,
    Path((tour_id, key)): Path<(Uuid, ButtonKey)>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<MediaUrlResponse>>, AppError> {
    upload_slot(&state, MediaSlot::from(key), tour_id, multipart).await
}

/// Remove a call-to-action button image
pub async fn delete_tour_button(
    State(state): State<Arc<AppState>>,
    Path((tour_id, key)): Path<(Uuid, ButtonKey)>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    remove_slot(&state, MediaSlot::from(key), tour_id).await
}

/// Upload a tour intro audio file
pub async fn upload_tour_intro_audio(
    State(state): State<Arc<AppState>>,
    Path(tour_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<MediaUrlResponse>>, AppError> {
    upload_slot(&state, MediaSlot::TourIntroAudio, tour_id, multipart).await
}

/// Remove a tour intro audio file
pub async fn delete_tour_intro_audio(
    State(state): State<Arc<AppState>>,
    Path(tour_id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    remove_slot(&state, MediaSlot::TourIntroAudio, tour_id).await
}

// ============= Stop media =============

/// Upload a stop audio file
pub async fn upload_stop_audio(
    State(state): State<Arc<AppState>>,
    Path(stop_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<MediaUrlResponse>>, AppError> {
    upload_slot(&state, MediaSlot::StopAudio, stop_id, multipart).await
}

/// Remove a stop audio file
pub async fn delete_stop_audio(
    State(state): State<Arc<AppState>>,
    Path(stop_id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    remove_slot(&state, MediaSlot::StopAudio, stop_id).await
}

/// Upload a stop image
pub async fn upload_stop_image(
    State(state): State<Arc<AppState>>,
    Path(stop_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<MediaUrlResponse>>, AppError> {
    upload_slot(&state, MediaSlot::StopImage, stop_id, multipart).await
}

/// Remove a stop image
pub async fn delete_stop_image(
    State(state): State<Arc<AppState>>,
    Path(stop_id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    remove_slot(&state, MediaSlot::StopImage, stop_id).await
}

// ============= Category media =============

/// Upload a category cover image; returns the public URL without
/// persisting a pointer (categories carry no media column)
pub async fn upload_category_cover(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<MediaUrlResponse>>, AppError> {
    let upload = read_upload(&mut multipart).await?;

    let url = state
        .media
        .upload_category_cover(
            category_id,
            upload.file_name.as_deref(),
            upload.content_type,
            upload.data,
        )
        .await?;

    Ok(Json(ApiResponse::success(MediaUrlResponse { url })))
}
