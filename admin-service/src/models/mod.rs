use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub type AdminResult<T> = Result<T, AdminError>;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0} already exists")]
    AlreadyExists(&'static str),

    #[error("Category is referenced by {0} tour(s)")]
    CategoryInUse(i64),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid token")]
    InvalidToken,
}

// ============= Entities =============

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Admin identity without the credential hash, safe to return to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminPublic {
    pub id: Uuid,
    pub email: String,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<AdminUser> for AdminPublic {
    fn from(user: AdminUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            last_login: user.last_login,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tour {
    pub id: Uuid,
    pub title: String,
    pub city: Option<String>,
    pub is_published: bool,
    pub cover_image_url: Option<String>,
    pub highlights_image_url: Option<String>,
    pub map_image_url: Option<String>,
    pub start_image_url: Option<String>,
    pub intro_audio_url: Option<String>,
    pub start_touring_color_hex: Option<String>,
    pub highlights_button_color_hex: Option<String>,
    pub map_button_color_hex: Option<String>,
    pub where_starts_button_color_hex: Option<String>,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape for the tour list view.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TourSummary {
    pub id: Uuid,
    pub title: String,
    pub city: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Stop {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub title: String,
    pub lat: f64,
    pub lng: f64,
    pub radius_m: f64,
    pub pass_by: bool,
    pub audio_url: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tour together with its stops in play order.
#[derive(Debug, Serialize, Deserialize)]
pub struct TourDetail {
    pub tour: Tour,
    pub stops: Vec<Stop>,
}

// ============= Auth DTOs =============

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub admin: AdminPublic,
}

// ============= Catalog DTOs =============

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTourRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub city: Option<String>,
    pub is_published: Option<bool>,
}

/// Full-form tour save, mirroring the admin edit screen.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTourRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub city: Option<String>,
    pub is_published: bool,
    pub category_id: Option<Uuid>,
    #[validate(custom = "validate_color_hex")]
    pub start_touring_color_hex: Option<String>,
    #[validate(custom = "validate_color_hex")]
    pub highlights_button_color_hex: Option<String>,
    #[validate(custom = "validate_color_hex")]
    pub map_button_color_hex: Option<String>,
    #[validate(custom = "validate_color_hex")]
    pub where_starts_button_color_hex: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStopRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
    #[validate(range(min = 0.001, max = 200000.0))]
    pub radius_m: Option<f64>,
    pub pass_by: Option<bool>,
    pub audio_url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStopRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
    #[validate(range(min = 0.001, max = 200000.0))]
    pub radius_m: f64,
    pub pass_by: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Debug, Deserialize)]
pub struct MoveStopRequest {
    pub direction: MoveDirection,
}

/// The three call-to-action buttons a tour carries an image for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonKey {
    Highlights,
    Map,
    Start,
}

// ============= Validation helpers =============

/// Accepts `#RRGGBB` only; the admin UI color pickers require that exact form.
fn validate_color_hex(value: &str) -> Result<(), ValidationError> {
    let rest = value
        .strip_prefix('#')
        .ok_or_else(|| ValidationError::new("color_hex"))?;
    if rest.len() == 6 && rest.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::new("color_hex"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_accepts_rrggbb() {
        assert!(validate_color_hex("#1A2b3C").is_ok());
        assert!(validate_color_hex("#000000").is_ok());
    }

    #[test]
    fn test_color_hex_rejects_malformed() {
        assert!(validate_color_hex("1A2b3C").is_err());
        assert!(validate_color_hex("#1A2b3").is_err());
        assert!(validate_color_hex("#1A2b3CF").is_err());
        assert!(validate_color_hex("#GG0000").is_err());
        assert!(validate_color_hex("").is_err());
    }

    #[test]
    fn test_stop_request_coordinate_bounds() {
        let valid = CreateStopRequest {
            title: "Harbor".to_string(),
            lat: 43.6591,
            lng: -70.2568,
            radius_m: Some(75.0),
            pass_by: None,
            audio_url: None,
            image_url: None,
        };
        assert!(valid.validate().is_ok());

        let out_of_range = CreateStopRequest {
            lat: 91.0,
            ..valid
        };
        assert!(out_of_range.validate().is_err());
    }

    #[test]
    fn test_stop_request_rejects_nan_coordinates() {
        let req = CreateStopRequest {
            title: "Harbor".to_string(),
            lat: f64::NAN,
            lng: 0.0,
            radius_m: None,
            pass_by: None,
            audio_url: None,
            image_url: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_stop_request_rejects_nonpositive_radius() {
        let req = UpdateStopRequest {
            title: "Harbor".to_string(),
            lat: 0.0,
            lng: 0.0,
            radius_m: 0.0,
            pass_by: false,
        };
        assert!(req.validate().is_err());
    }
}
