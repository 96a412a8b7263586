mod auth;
mod config;
mod handlers;
mod middleware;
mod models;
mod services;
mod storage;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::auth::AuthService;
use crate::config::Config;
use crate::services::accounts::AccountService;
use crate::services::catalog::CatalogService;
use crate::services::media::MediaService;
use crate::storage::StorageClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .json()
        .init();

    info!("Starting Admin Service...");

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded successfully");

    // Initialize database connection pool
    let db_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    info!("Database connection pool established");

    // Run migrations
    sqlx::migrate!("./migrations").run(&db_pool).await?;
    info!("Database migrations completed");

    // Initialize services
    let auth = Arc::new(AuthService::new(config.jwt.clone()));
    let store = Arc::new(StorageClient::new(config.storage.clone())?);

    let accounts = Arc::new(AccountService::new(
        db_pool.clone(),
        auth.clone(),
        config.jwt.access_token_expiry_hours,
    ));
    let catalog = Arc::new(CatalogService::new(db_pool.clone()));
    let media = Arc::new(MediaService::new(db_pool.clone(), store));
    info!("Services initialized");

    // Seed the initial admin account if the table is empty
    if let (Some(email), Some(password)) = (
        config.bootstrap.admin_email.clone(),
        config.bootstrap.admin_password.clone(),
    ) {
        accounts.bootstrap_admin(&email, &password).await?;
    }

    // Build application state
    let app_state = Arc::new(AppState {
        auth,
        accounts,
        catalog,
        media,
    });

    // Configure CORS for the admin frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let max_body_bytes = (config.storage.max_upload_mb * 1024 * 1024) as usize + 64 * 1024;

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/auth/refresh", post(handlers::auth::refresh_token));

    let protected_routes = Router::new()
        .route("/api/v1/auth/logout", post(handlers::auth::logout))
        .route("/api/v1/auth/me", get(handlers::auth::me))

        // Category endpoints
        .route("/api/v1/categories", get(handlers::categories::list_categories))
        .route("/api/v1/categories", post(handlers::categories::create_category))
        .route("/api/v1/categories/:category_id", delete(handlers::categories::delete_category))
        .route("/api/v1/categories/:category_id/cover", post(handlers::media::upload_category_cover))

        // Tour endpoints
        .route("/api/v1/tours", get(handlers::tours::list_tours))
        .route("/api/v1/tours", post(handlers::tours::create_tour))
        .route("/api/v1/tours/:tour_id", get(handlers::tours::get_tour))
        .route("/api/v1/tours/:tour_id", put(handlers::tours::update_tour))
        .route("/api/v1/tours/:tour_id", delete(handlers::tours::delete_tour))

        // Tour media endpoints
        .route("/api/v1/tours/:tour_id/cover", post(handlers::media::upload_tour_cover))
        .route("/api/v1/tours/:tour_id/cover", delete(handlers::media::delete_tour_cover))
        .route("/api/v1/tours/:tour_id/buttons/:key", post(handlers::media::upload_tour_button))
        .route("/api/v1/tours/:tour_id/buttons/:key", delete(handlers::media::delete_tour_button))
        .route("/api/v1/tours/:tour_id/intro-audio", post(handlers::media::upload_tour_intro_audio))
        .route("/api/v1/tours/:tour_id/intro-audio", delete(handlers::media::delete_tour_intro_audio))

        // Stop endpoints
        .route("/api/v1/tours/:tour_id/stops", get(handlers::stops::list_stops))
        .route("/api/v1/tours/:tour_id/stops", post(handlers::stops::create_stop))
        .route("/api/v1/stops/:stop_id", put(handlers::stops::update_stop))
        .route("/api/v1/stops/:stop_id", delete(handlers::stops::delete_stop))
        .route("/api/v1/stops/:stop_id/move", post(handlers::stops::move_stop))

        // Stop media endpoints
        .route("/api/v1/stops/:stop_id/audio", post(handlers::media::upload_stop_audio))
        .route("/api/v1/stops/:stop_id/audio", delete(handlers::media::delete_stop_audio))
        .route("/api/v1/stops/:stop_id/image", post(handlers::media::upload_stop_image))
        .route("/api/v1/stops/:stop_id/image", delete(handlers::media::delete_stop_image))

        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth_middleware,
        ));

    let app = public_routes
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Admin Service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub struct AppState {
    pub auth: Arc<AuthService>,
    pub accounts: Arc<AccountService>,
    pub catalog: Arc<CatalogService>,
    pub media: Arc<MediaService>,
}
