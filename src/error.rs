use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::InvalidSeat;

/// Ошибки хранилища мест. Ядро их не повторяет, а отдаёт наверх как `StorageUnavailable`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("corrupt seat record: {0}")]
    Corrupt(#[from] InvalidSeat),
}

/// Результаты операций аллокатора, отличные от успеха. Все восстановимые.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Invalid number of seats ({requested}). You can only book between 1 and 7 seats.")]
    InvalidRequest { requested: String },
    #[error("Not enough seats available: requested {requested}, available {available}.")]
    InsufficientSeats { requested: u32, available: usize },
    #[error("Seat {seat_id} was taken concurrently, retry the booking.")]
    Conflict { seat_id: u32 },
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

impl BookingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BookingError::InvalidRequest { .. } | BookingError::InsufficientSeats { .. } => {
                StatusCode::BAD_REQUEST
            }
            BookingError::Conflict { .. } => StatusCode::CONFLICT,
            BookingError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let BookingError::StorageUnavailable(e) = &self {
            tracing::error!("storage failure: {:?}", e);
            // детали хранилища наружу не отдаём
            return (status, "Storage unavailable.".to_string()).into_response();
        }
        (status, self.to_string()).into_response()
    }
}
