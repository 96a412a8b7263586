use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::models::{AdminError, AdminResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // Admin user ID
    pub email: String,
    pub exp: i64,           // Expiry timestamp
    pub iat: i64,           // Issued at timestamp
    pub token_type: String, // "access" or "refresh"
}

pub struct AuthService {
    jwt_config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(jwt_config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(jwt_config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(jwt_config.secret.as_bytes());

        Self {
            jwt_config,
            encoding_key,
            decoding_key,
        }
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AdminResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AdminError::ValidationError(format!("Failed to hash password: {}", e)))?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a hash
    pub fn verify_password(&self, password: &str, password_hash: &str) -> AdminResult<bool> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| AdminError::ValidationError(format!("Invalid password hash: {}", e)))?;

        let argon2 = Argon2::default();

        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    /// Generate an access token
    pub fn generate_access_token(&self, admin_id: Uuid, email: &str) -> AdminResult<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.jwt_config.access_token_expiry_hours as i64);

        let claims = Claims {
            sub: admin_id.to_string(),
            email: email.to_string(),
            exp: expiry.timestamp(),
            iat: now.timestamp(),
            token_type: "access".to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AdminError::AuthenticationError(format!("Failed to generate token: {}", e)))
    }

    /// Generate a refresh token
    pub fn generate_refresh_token(&self, admin_id: Uuid, email: &str) -> AdminResult<String> {
        let now = Utc::now();
        let expiry = now + Duration::days(self.jwt_config.refresh_token_expiry_days as i64);

        let claims = Claims {
            sub: admin_id.to_string(),
            email: email.to_string(),
            exp: expiry.timestamp(),
            iat: now.timestamp(),
            token_type: "refresh".to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            AdminError::AuthenticationError(format!("Failed to generate refresh token: {}", e))
        })
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> AdminResult<Claims> {
        let validation = Validation::default();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_e| AdminError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> AuthService {
        AuthService::new(JwtConfig {
            secret: "test-secret-that-is-long-enough".to_string(),
            access_token_expiry_hours: 1,
            refresh_token_expiry_days: 7,
        })
    }

    #[test]
    fn test_password_hash_and_verify() {
        let service = test_service();
        let hash = service.hash_password("hunter2!").unwrap();

        assert_ne!(hash, "hunter2!");
        assert!(service.verify_password("hunter2!", &hash).unwrap());
        assert!(!service.verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = test_service();
        let admin_id = Uuid::new_v4();

        let token = service
            .generate_access_token(admin_id, "admin@example.com")
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, admin_id.to_string());
        assert_eq!(claims.email, "admin@example.com");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_refresh_token_is_marked_as_refresh() {
        let service = test_service();
        let token = service
            .generate_refresh_token(Uuid::new_v4(), "admin@example.com")
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.token_type, "refresh");
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let service = test_service();
        assert!(matches!(
            service.validate_token("not-a-jwt"),
            Err(AdminError::InvalidToken)
        ));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let service = test_service();
        let other = AuthService::new(JwtConfig {
            secret: "a-completely-different-secret".to_string(),
            access_token_expiry_hours: 1,
            refresh_token_expiry_days: 7,
        });

        let token = other
            .generate_access_token(Uuid::new_v4(), "admin@example.com")
            .unwrap();
        assert!(service.validate_token(&token).is_err());
    }
}
