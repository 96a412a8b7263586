use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use shared::types::{ApiResponse, MessageResponse};

use crate::auth::Claims;
use crate::models::*;
use crate::AppState;

// ============= Request Types =============

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

// ============= Handlers =============

/// Authenticate an admin and issue a token pair
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let response = state.accounts.login(req).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// Exchange a refresh token for a new token pair
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let response = state.accounts.refresh(&req.refresh_token).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// Logout acknowledgement; tokens are stateless and simply discarded
pub async fn logout(
    Extension(_claims): Extension<Claims>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Successfully logged out",
    ))))
}

/// Current admin identity
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<AdminPublic>>, AppError> {
    let admin_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Admin(AdminError::InvalidToken))?;

    let admin = state.accounts.get_admin(admin_id).await?;
    Ok(Json(ApiResponse::success(admin)))
}

// ============= Error Handling =============

#[derive(Debug)]
pub enum AppError {
    Admin(AdminError),
    BadRequest(String),
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        AppError::Admin(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Admin(AdminError::ValidationError(msg)) => (StatusCode::BAD_REQUEST, msg),
            AppError::Admin(AdminError::AuthenticationError(msg)) => {
                (StatusCode::UNAUTHORIZED, msg)
            }
            AppError::Admin(AdminError::Unauthorized(msg)) => (StatusCode::FORBIDDEN, msg),
            AppError::Admin(err @ AdminError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            AppError::Admin(err @ AdminError::AlreadyExists(_)) => {
                (StatusCode::CONFLICT, err.to_string())
            }
            AppError::Admin(err @ AdminError::CategoryInUse(_)) => {
                (StatusCode::CONFLICT, err.to_string())
            }
            AppError::Admin(AdminError::DatabaseError(msg)) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Admin(AdminError::StorageError(msg)) => {
                tracing::error!("Storage error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Storage backend error".to_string(),
                )
            }
            AppError::Admin(AdminError::InvalidToken) => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (
                AppError::Admin(AdminError::ValidationError("bad".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Admin(AdminError::AuthenticationError("no".into())),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::Admin(AdminError::NotFound("Tour")),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::Admin(AdminError::AlreadyExists("Category")),
                StatusCode::CONFLICT,
            ),
            (
                AppError::Admin(AdminError::CategoryInUse(3)),
                StatusCode::CONFLICT,
            ),
            (
                AppError::Admin(AdminError::DatabaseError("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Admin(AdminError::StorageError("down".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Admin(AdminError::InvalidToken),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::BadRequest("missing file".into()),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
