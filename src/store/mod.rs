//! Хранилище инвентаря мест.
//!
//! Аллокатор не знает, где лежат места: он работает через [`SeatStore`].
//! Каждая реализация обязана отдавать согласованный снимок и применять бронь
//! целиком или не применять вовсе.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::Seat;

pub mod memory;
pub mod postgres;
pub mod redis_store;

pub use memory::MemorySeatStore;
pub use postgres::PgSeatStore;
pub use redis_store::RedisSeatStore;

/// Место, выбранное по снимку, вместе с версией, которую видел аллокатор.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatClaim {
    pub id: u32,
    pub version: u64,
}

impl From<&Seat> for SeatClaim {
    fn from(seat: &Seat) -> Self {
        SeatClaim { id: seat.id(), version: seat.version() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Все места перешли в `booked`, по возрастанию id.
    Committed(Vec<Seat>),
    /// Место изменилось после снимка, ничего не записано.
    Stale { seat_id: u32 },
}

#[async_trait]
pub trait SeatStore: Send + Sync + 'static {
    /// Согласованный снимок всех мест по возрастанию id.
    async fn load_all(&self) -> Result<Vec<Seat>, StoreError>;

    /// Атомарно заменить весь инвентарь.
    async fn replace_all(&self, seats: &[Seat]) -> Result<(), StoreError>;

    /// Атомарно забронировать места, если каждое всё ещё свободно и версия не менялась.
    async fn commit_booking(
        &self,
        claims: &[SeatClaim],
        holder: Option<&str>,
    ) -> Result<CommitOutcome, StoreError>;

    /// Имя бэкенда для логов.
    fn backend(&self) -> &'static str;
}
