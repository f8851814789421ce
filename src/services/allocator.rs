//! Аллокатор мест.
//!
//! Владеет хранилищем и писательским локом. Бронь и сброс идут под одним локом,
//! чтение списка мест полагается на согласованный снимок хранилища.
//! Дополнительно хранилище проверяет версии мест, так что несколько экземпляров
//! сервиса над одной базой тоже не продадут одно место дважды.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::BookingError;
use crate::models::{layout, Seat};
use crate::services::selection::{select_seats, RowPolicy};
use crate::store::{CommitOutcome, SeatClaim, SeatStore};

pub const MIN_SEATS_PER_BOOKING: i64 = 1;
pub const MAX_SEATS_PER_BOOKING: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub total: usize,
    pub available: usize,
    pub booked: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatRow {
    pub row: u32,
    pub seats: Vec<Seat>,
}

pub struct SeatAllocator {
    store: Arc<dyn SeatStore>,
    write_lock: Mutex<()>,
    policy: RowPolicy,
}

impl SeatAllocator {
    pub fn new(store: Arc<dyn SeatStore>, policy: RowPolicy) -> Self {
        Self { store, write_lock: Mutex::new(()), policy }
    }

    pub fn policy(&self) -> RowPolicy {
        self.policy
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Сбросить инвентарь: 80 свободных мест. Исключает параллельные брони.
    pub async fn initialize(&self) -> Result<(), BookingError> {
        let _guard = self.write_lock.lock().await;
        self.store.replace_all(&Seat::fresh_inventory()).await?;
        info!("Seat inventory initialized ({} seats, backend={})", layout::TOTAL_SEATS, self.backend());
        Ok(())
    }

    /// Снимок всех мест по возрастанию id.
    pub async fn list_seats(&self) -> Result<Vec<Seat>, BookingError> {
        let mut seats = self.store.load_all().await?;
        seats.sort_by_key(Seat::id);
        Ok(seats)
    }

    pub async fn availability(&self) -> Result<Availability, BookingError> {
        let seats = self.list_seats().await?;
        let available = seats.iter().filter(|s| s.is_available()).count();
        Ok(Availability { total: seats.len(), available, booked: seats.len() - available })
    }

    /// Снимок, разложенный по физическим рядам (для сетки мест в UI).
    pub async fn rows(&self) -> Result<Vec<SeatRow>, BookingError> {
        let seats = self.list_seats().await?;
        let mut rows: Vec<SeatRow> = (0..layout::ROW_COUNT)
            .map(|row| SeatRow { row, seats: Vec::new() })
            .collect();
        for seat in seats {
            if let Some(row) = layout::row_of(seat.id()) {
                rows[row as usize].seats.push(seat);
            }
        }
        Ok(rows)
    }

    /// Забронировать `count` мест (1..=7).
    ///
    /// `Conflict` означает, что место ушло между снимком и записью; ничего не записано,
    /// повторять или нет — решает вызывающий.
    pub async fn book(&self, count: i64, holder: Option<String>) -> Result<Vec<Seat>, BookingError> {
        if !(MIN_SEATS_PER_BOOKING..=MAX_SEATS_PER_BOOKING).contains(&count) {
            return Err(BookingError::InvalidRequest { requested: count.to_string() });
        }
        let count = count as usize;
        let holder = holder
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty());

        let _guard = self.write_lock.lock().await;

        let snapshot = self.store.load_all().await?;
        let mut available: Vec<&Seat> = snapshot.iter().filter(|s| s.is_available()).collect();
        available.sort_by_key(|s| s.id());

        if available.len() < count {
            return Err(BookingError::InsufficientSeats {
                requested: count as u32,
                available: available.len(),
            });
        }

        let ids: Vec<u32> = available.iter().map(|s| s.id()).collect();
        let chosen = select_seats(&ids, count, self.policy).ok_or(BookingError::InsufficientSeats {
            requested: count as u32,
            available: ids.len(),
        })?;
        debug!("Selected seats {:?} for {} requested (policy={:?})", chosen, count, self.policy);

        let claims: Vec<SeatClaim> = available
            .iter()
            .filter(|s| chosen.contains(&s.id()))
            .map(|s| SeatClaim::from(*s))
            .collect();

        match self.store.commit_booking(&claims, holder.as_deref()).await? {
            CommitOutcome::Committed(mut seats) => {
                seats.sort_by_key(Seat::id);
                info!("Booked seats {:?} for {:?}", chosen, holder);
                Ok(seats)
            }
            CommitOutcome::Stale { seat_id } => {
                warn!("Booking conflict on seat {}, nothing written", seat_id);
                Err(BookingError::Conflict { seat_id })
            }
        }
    }
}
