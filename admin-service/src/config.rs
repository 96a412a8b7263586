use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_hours: u64,
    pub refresh_token_expiry_days: u64,
}

/// Connection settings for the Supabase-style object store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub service_key: String,
    pub max_upload_mb: u64,
    pub request_timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:54321".to_string(), // local Supabase default
            bucket: "tour-media".to_string(),
            service_key: "service-key".to_string(),
            max_upload_mb: 50,
            request_timeout_seconds: 60,
        }
    }
}

/// Optional initial admin credentials, applied only when the table is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let storage_defaults = StorageConfig::default();

        Ok(Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()?,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")?,
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
            },
            jwt: JwtConfig {
                secret: std::env::var("JWT_SECRET")?,
                access_token_expiry_hours: std::env::var("ACCESS_TOKEN_EXPIRY_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse()?,
                refresh_token_expiry_days: std::env::var("REFRESH_TOKEN_EXPIRY_DAYS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
            },
            storage: StorageConfig {
                endpoint: std::env::var("STORAGE_ENDPOINT")?
                    .trim_end_matches('/')
                    .to_string(),
                bucket: std::env::var("STORAGE_BUCKET")
                    .unwrap_or_else(|_| storage_defaults.bucket.clone()),
                service_key: std::env::var("STORAGE_SERVICE_KEY")?,
                max_upload_mb: std::env::var("STORAGE_MAX_UPLOAD_MB")
                    .unwrap_or_else(|_| storage_defaults.max_upload_mb.to_string())
                    .parse()?,
                request_timeout_seconds: std::env::var("STORAGE_REQUEST_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| storage_defaults.request_timeout_seconds.to_string())
                    .parse()?,
            },
            bootstrap: BootstrapConfig {
                admin_email: std::env::var("ADMIN_EMAIL").ok(),
                admin_password: std::env::var("ADMIN_PASSWORD").ok(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.bucket, "tour-media");
        assert_eq!(config.max_upload_mb, 50);
        assert!(!config.endpoint.ends_with('/'));
    }
}
