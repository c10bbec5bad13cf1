use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    config::{AppConfig, load_s3_client},
    database,
    error::Result,
    routes,
    services::{ObjectStorage, S3Storage},
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub storage: Arc<dyn ObjectStorage>,
    pub config: Arc<AppConfig>,
}

pub async fn build(config: &AppConfig) -> Result<Router> {
    let pool = database::create_pool(&config.database).await?;

    let s3_client = load_s3_client().await?;
    let storage: Arc<dyn ObjectStorage> =
        Arc::new(S3Storage::new(s3_client, config.storage.bucket.clone()));

    let state = AppState {
        db: pool,
        storage,
        config: Arc::new(config.clone()),
    };

    let allowed_origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .map(|origin| {
            origin.parse::<HeaderValue>().map_err(|_| {
                crate::error::AppError::ConfigError(format!("Invalid CORS origin: {}", origin))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            http::header::CONTENT_TYPE,
            http::header::AUTHORIZATION,
        ])
        .allow_origin(allowed_origins);

    let app = routes::create_router(&state)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.read_timeout,
        )))
        .layer(cors)
        .with_state(state);

    Ok(app)
}
