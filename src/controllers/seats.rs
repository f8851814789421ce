use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::error::BookingError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/initialize", get(initialize_seats))
        .route("/seats", get(get_seats))
        .route("/seats/rows", get(get_seat_rows))
        .route("/seats/summary", get(get_summary))
}

// GET /initialize — полный сброс инвентаря
async fn initialize_seats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, BookingError> {
    tracing::warn!("RESET: re-initializing seat inventory");
    state.allocator.initialize().await?;
    Ok((StatusCode::OK, "Seats initialized."))
}

// GET /seats
async fn get_seats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, BookingError> {
    let seats = state.allocator.list_seats().await?;
    Ok((StatusCode::OK, Json(seats)))
}

// GET /seats/rows — те же места, сгруппированные по рядам
async fn get_seat_rows(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, BookingError> {
    let rows = state.allocator.rows().await?;
    Ok((StatusCode::OK, Json(rows)))
}

// GET /seats/summary
async fn get_summary(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, BookingError> {
    let summary = state.allocator.availability().await?;
    Ok((StatusCode::OK, Json(summary)))
}
