use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use validator::Validate;

use crate::error::BookingError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/book", post(book_seats))
}

// POST /book
// numSeats принимаем как произвольный JSON: 2.5, "3" или отсутствие поля — это тот же 400,
// что и число вне диапазона, а не 422 от экстрактора
#[derive(Debug, Deserialize)]
struct BookRequest {
    #[serde(rename = "numSeats", default)]
    num_seats: Option<Value>,
    #[serde(rename = "userName", alias = "user_name", default)]
    user_name: Option<String>,
}

#[derive(Debug, Validate)]
struct SeatCount {
    #[validate(range(min = 1, max = 7))]
    value: i64,
}

impl BookRequest {
    fn seat_count(&self) -> Result<i64, BookingError> {
        let invalid = || BookingError::InvalidRequest {
            requested: self
                .num_seats
                .as_ref()
                .map(Value::to_string)
                .unwrap_or_else(|| "missing".to_string()),
        };

        let value = self.num_seats.as_ref().and_then(Value::as_i64).ok_or_else(invalid)?;
        let count = SeatCount { value };
        count.validate().map_err(|_| invalid())?;
        Ok(count.value)
    }
}

async fn book_seats(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let count = req.seat_count()?;
    let seats = state.allocator.book(count, req.user_name).await?;
    Ok((StatusCode::OK, Json(seats)))
}
