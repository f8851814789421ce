use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::services::selection::RowPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
}

// Главная структура конфигурации
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub storage: StorageConfig,
    pub booking: BookingConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
    Redis,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "postgres" => Ok(StorageBackend::Postgres),
            "redis" => Ok(StorageBackend::Redis),
            _ => Err(()),
        }
    }
}

// Где живёт инвентарь мест
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database: Option<DatabaseConfig>,
    pub redis: Option<RedisConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

// Настройки бронирования
#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    pub row_policy: RowPolicy,
    pub initialize_on_start: bool,
}

/// Переменная окружения или значение по умолчанию, разобранное в `T`.
fn parse_var<T: FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = env::var(name).unwrap_or_else(|_| default.to_string());
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend: StorageBackend = parse_var("STORAGE_BACKEND", "memory")?;

        let database = match backend {
            StorageBackend::Postgres => Some(DatabaseConfig {
                url: required_var("DATABASE_URL")?,
                pool_size: parse_var("DB_POOL_SIZE", "20")?,
            }),
            _ => None,
        };
        let redis = match backend {
            StorageBackend::Redis => Some(RedisConfig { url: required_var("REDIS_URL")? }),
            _ => None,
        };

        Ok(Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("PORT", "5000")?,
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "seat_booking=debug,tower_http=debug".to_string()),
            },
            storage: StorageConfig { backend, database, redis },
            booking: BookingConfig {
                row_policy: parse_var("ROW_POLICY", "physical")?,
                initialize_on_start: parse_var("INITIALIZE_ON_START", "true")?,
            },
        })
    }

    /// Конфигурация для тестов и локального запуска: память, физические ряды.
    pub fn in_memory() -> Self {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                environment: "test".to_string(),
                rust_log: "seat_booking=debug".to_string(),
            },
            storage: StorageConfig { backend: StorageBackend::Memory, database: None, redis: None },
            booking: BookingConfig { row_policy: RowPolicy::Physical, initialize_on_start: true },
        }
    }
}
