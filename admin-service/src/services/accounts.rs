//! Admin account management: login, token refresh, and the startup seed.

use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthService;
use crate::models::*;

pub struct AccountService {
    db_pool: PgPool,
    auth: Arc<AuthService>,
    access_token_expiry_hours: u64,
}

impl AccountService {
    pub fn new(db_pool: PgPool, auth: Arc<AuthService>, access_token_expiry_hours: u64) -> Self {
        Self {
            db_pool,
            auth,
            access_token_expiry_hours,
        }
    }

    /// Authenticate an admin with email and password
    pub async fn login(&self, req: LoginRequest) -> AdminResult<AuthResponse> {
        // Trim the email first; pasted credentials often carry invisible whitespace
        let req = LoginRequest {
            email: req.email.trim().to_string(),
            password: req.password,
        };

        req.validate()
            .map_err(|e| AdminError::ValidationError(format!("{}", e)))?;

        let admin = sqlx::query_as::<_, AdminUser>("SELECT * FROM admin_users WHERE email = $1")
            .bind(&req.email)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?
            .ok_or_else(|| {
                AdminError::AuthenticationError("Invalid email or password".to_string())
            })?;

        if !admin.is_active {
            return Err(AdminError::AuthenticationError(
                "Account is disabled".to_string(),
            ));
        }

        if !self.auth.verify_password(&req.password, &admin.password_hash)? {
            return Err(AdminError::AuthenticationError(
                "Invalid email or password".to_string(),
            ));
        }

        sqlx::query("UPDATE admin_users SET last_login = NOW() WHERE id = $1")
            .bind(admin.id)
            .execute(&self.db_pool)
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        self.token_pair(admin)
    }

    /// Exchange a refresh token for a new token pair
    pub async fn refresh(&self, refresh_token: &str) -> AdminResult<AuthResponse> {
        let claims = self.auth.validate_token(refresh_token)?;

        if claims.token_type != "refresh" {
            return Err(AdminError::InvalidToken);
        }

        let admin_id = Uuid::parse_str(&claims.sub).map_err(|_| AdminError::InvalidToken)?;
        let admin = self.get_admin_user(admin_id).await?;

        if !admin.is_active {
            return Err(AdminError::AuthenticationError(
                "Account is disabled".to_string(),
            ));
        }

        self.token_pair(admin)
    }

    /// Current admin identity for the `me` endpoint
    pub async fn get_admin(&self, admin_id: Uuid) -> AdminResult<AdminPublic> {
        Ok(self.get_admin_user(admin_id).await?.into())
    }

    /// Seed the initial admin account when the table is empty.
    ///
    /// The hosted-console workflow this replaces created admins out-of-band;
    /// here the first deployment provides credentials through the
    /// environment instead.
    pub async fn bootstrap_admin(&self, email: &str, password: &str) -> AdminResult<bool> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admin_users")
            .fetch_one(&self.db_pool)
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        if count > 0 {
            tracing::debug!("Admin accounts already exist, skipping bootstrap");
            return Ok(false);
        }

        let password_hash = self.auth.hash_password(password)?;

        sqlx::query(
            r#"
            INSERT INTO admin_users (id, email, password_hash, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, true, NOW(), NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email.trim())
        .bind(&password_hash)
        .execute(&self.db_pool)
        .await
        .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        tracing::info!("Bootstrapped initial admin account: {}", email);
        Ok(true)
    }

    async fn get_admin_user(&self, admin_id: Uuid) -> AdminResult<AdminUser> {
        sqlx::query_as::<_, AdminUser>("SELECT * FROM admin_users WHERE id = $1")
            .bind(admin_id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?
            .ok_or(AdminError::NotFound("Admin user"))
    }

    fn token_pair(&self, admin: AdminUser) -> AdminResult<AuthResponse> {
        let access_token = self.auth.generate_access_token(admin.id, &admin.email)?;
        let refresh_token = self.auth.generate_refresh_token(admin.id, &admin.email)?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry_hours * 3600,
            admin: admin.into(),
        })
    }
}
