use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CommitOutcome, SeatClaim, SeatStore};
use crate::error::StoreError;
use crate::models::Seat;

/// Инвентарь в памяти процесса. Снимок берётся под read-локом, бронь под write-локом.
#[derive(Debug, Default)]
pub struct MemorySeatStore {
    seats: RwLock<Vec<Seat>>,
}

impl MemorySeatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seats(seats: Vec<Seat>) -> Self {
        Self { seats: RwLock::new(seats) }
    }
}

#[async_trait]
impl SeatStore for MemorySeatStore {
    async fn load_all(&self) -> Result<Vec<Seat>, StoreError> {
        let mut seats = self.seats.read().await.clone();
        seats.sort_by_key(Seat::id);
        Ok(seats)
    }

    async fn replace_all(&self, seats: &[Seat]) -> Result<(), StoreError> {
        *self.seats.write().await = seats.to_vec();
        Ok(())
    }

    async fn commit_booking(
        &self,
        claims: &[SeatClaim],
        holder: Option<&str>,
    ) -> Result<CommitOutcome, StoreError> {
        let mut seats = self.seats.write().await;

        // Сначала проверяем все места, потом меняем: частичной брони быть не должно
        let mut positions = Vec::with_capacity(claims.len());
        for claim in claims {
            let pos = seats
                .iter()
                .position(|s| s.id() == claim.id && s.version() == claim.version && s.is_available());
            match pos {
                Some(pos) => positions.push(pos),
                None => return Ok(CommitOutcome::Stale { seat_id: claim.id }),
            }
        }

        let mut booked = Vec::with_capacity(positions.len());
        for pos in positions {
            if let Some(next) = seats[pos].book(holder) {
                seats[pos] = next.clone();
                booked.push(next);
            }
        }
        booked.sort_by_key(Seat::id);
        Ok(CommitOutcome::Committed(booked))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
