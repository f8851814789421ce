pub mod config;
pub mod controllers;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

use axum::{extract::State, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use config::{Config, StorageBackend};
use error::StoreError;
use services::allocator::SeatAllocator;
use store::{MemorySeatStore, PgSeatStore, RedisSeatStore, SeatStore};

// Shared state для всего приложения
pub struct AppState {
    pub config: Config,
    pub allocator: SeatAllocator,
}

impl AppState {
    /// Поднять хранилище по конфигурации и собрать аллокатор.
    pub async fn new(config: Config) -> Result<Arc<Self>, StoreError> {
        let store: Arc<dyn SeatStore> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(MemorySeatStore::new()),
            StorageBackend::Postgres => {
                let db_config = config
                    .storage
                    .database
                    .as_ref()
                    .ok_or_else(|| sqlx::Error::Configuration("database settings missing".into()))?;
                Arc::new(PgSeatStore::connect(db_config).await?)
            }
            StorageBackend::Redis => {
                let redis_config = config.storage.redis.as_ref().ok_or_else(|| {
                    redis::RedisError::from((redis::ErrorKind::InvalidClientConfig, "redis settings missing"))
                })?;
                Arc::new(RedisSeatStore::connect(redis_config).await?)
            }
        };

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn SeatStore>) -> Arc<Self> {
        let allocator = SeatAllocator::new(store, config.booking.row_policy);
        Arc::new(Self { config, allocator })
    }
}

// GET / — версия, окружение и настройки бронирования
async fn banner(State(state): State<Arc<AppState>>) -> String {
    format!(
        "Train Seat Booking API v1.0 (env={}, storage={}, row_policy={:?})",
        state.config.app.environment,
        state.allocator.backend(),
        state.config.booking.row_policy,
    )
}

/// Главный роутер: служебные маршруты, API мест, трассировка и CORS.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(|| async { "OK" }))
        .merge(controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
