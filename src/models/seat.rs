use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::layout;

/// Статус места. Закрытый набор из двух состояний, другие значения отвергаются при разборе.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Booked,
}

impl SeatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatStatus::Available => "available",
            SeatStatus::Booked => "booked",
        }
    }
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeatStatus {
    type Err = InvalidSeat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(SeatStatus::Available),
            "booked" => Ok(SeatStatus::Booked),
            other => Err(InvalidSeat::UnknownStatus(other.to_string())),
        }
    }
}

/// Причины, по которым запись из хранилища не может стать [`Seat`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSeat {
    #[error("unknown seat status `{0}`")]
    UnknownStatus(String),
    #[error("seat id {0} is outside 1..={max}", max = layout::TOTAL_SEATS)]
    IdOutOfRange(i64),
    #[error("seat {0} is available but carries a holder")]
    HolderOnAvailable(u32),
    #[error("seat {0} has negative version {1}")]
    NegativeVersion(u32, i64),
    #[error("seat {0} has unreadable version `{1}`")]
    UnreadableVersion(u32, String),
}

/// Место в вагоне.
///
/// Поля закрыты: держатель может быть только у забронированного места,
/// а `version` растёт при каждом переходе и служит для compare-and-set в хранилищах.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Seat {
    id: u32,
    status: SeatStatus,
    #[serde(rename = "user_name")]
    holder: Option<String>,
    #[serde(skip)]
    version: u64,
}

impl Seat {
    pub fn available(id: u32) -> Self {
        Self { id, status: SeatStatus::Available, holder: None, version: 0 }
    }

    /// Восстановить место из сохранённых полей с проверкой инвариантов.
    pub fn restore(
        id: u32,
        status: SeatStatus,
        holder: Option<String>,
        version: u64,
    ) -> Result<Self, InvalidSeat> {
        if !layout::is_valid_seat_id(id) {
            return Err(InvalidSeat::IdOutOfRange(id as i64));
        }
        if status == SeatStatus::Available && holder.is_some() {
            return Err(InvalidSeat::HolderOnAvailable(id));
        }
        Ok(Self { id, status, holder, version })
    }

    /// Полный свежий инвентарь: 80 свободных мест, версия 0.
    pub fn fresh_inventory() -> Vec<Seat> {
        (1..=layout::TOTAL_SEATS).map(Seat::available).collect()
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn status(&self) -> SeatStatus {
        self.status
    }

    pub fn holder(&self) -> Option<&str> {
        self.holder.as_deref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_available(&self) -> bool {
        self.status == SeatStatus::Available
    }

    /// Переход available -> booked. Возвращает `None`, если место уже занято.
    pub fn book(&self, holder: Option<&str>) -> Option<Seat> {
        if !self.is_available() {
            return None;
        }
        Some(Seat {
            id: self.id,
            status: SeatStatus::Booked,
            holder: holder.map(str::to_owned),
            version: self.version + 1,
        })
    }
}

/// Строка таблицы `seats` / документ в хранилище.
#[derive(Debug, Clone, FromRow)]
pub struct SeatRecord {
    pub id: i32,
    pub status: String,
    pub user_name: Option<String>,
    pub version: i64,
}

impl TryFrom<SeatRecord> for Seat {
    type Error = InvalidSeat;

    fn try_from(record: SeatRecord) -> Result<Self, Self::Error> {
        let id = u32::try_from(record.id)
            .map_err(|_| InvalidSeat::IdOutOfRange(record.id as i64))?;
        let status = record.status.parse()?;
        let version = u64::try_from(record.version)
            .map_err(|_| InvalidSeat::NegativeVersion(id, record.version))?;
        Seat::restore(id, status, record.user_name, version)
    }
}

impl From<&Seat> for SeatRecord {
    fn from(seat: &Seat) -> Self {
        SeatRecord {
            id: seat.id as i32,
            status: seat.status.as_str().to_string(),
            user_name: seat.holder.clone(),
            version: seat.version as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i32, status: &str, user_name: Option<&str>) -> SeatRecord {
        SeatRecord { id, status: status.to_string(), user_name: user_name.map(Into::into), version: 3 }
    }

    #[test]
    fn fresh_inventory_is_all_available() {
        let seats = Seat::fresh_inventory();
        assert_eq!(seats.len(), 80);
        assert!(seats.iter().all(|s| s.is_available() && s.holder().is_none() && s.version() == 0));
        assert_eq!(seats.first().map(Seat::id), Some(1));
        assert_eq!(seats.last().map(Seat::id), Some(80));
    }

    #[test]
    fn booking_sets_holder_and_bumps_version() {
        let seat = Seat::available(5);
        let booked = seat.book(Some("anna")).unwrap();
        assert_eq!(booked.status(), SeatStatus::Booked);
        assert_eq!(booked.holder(), Some("anna"));
        assert_eq!(booked.version(), 1);
        assert!(booked.book(None).is_none());
    }

    #[test]
    fn record_with_unknown_status_is_rejected() {
        let err = Seat::try_from(record(1, "reserved", None)).unwrap_err();
        assert_eq!(err, InvalidSeat::UnknownStatus("reserved".into()));
    }

    #[test]
    fn record_invariants_are_checked() {
        assert_eq!(
            Seat::try_from(record(81, "available", None)).unwrap_err(),
            InvalidSeat::IdOutOfRange(81)
        );
        assert_eq!(
            Seat::try_from(record(4, "available", Some("x"))).unwrap_err(),
            InvalidSeat::HolderOnAvailable(4)
        );
        let seat = Seat::try_from(record(4, "booked", Some("x"))).unwrap();
        assert_eq!(seat.version(), 3);
        assert_eq!(seat.holder(), Some("x"));
    }

    #[test]
    fn wire_shape_matches_documents() {
        let seat = Seat::available(7).book(None).unwrap();
        let json = serde_json::to_value(&seat).unwrap();
        assert_eq!(json, serde_json::json!({"id": 7, "status": "booked", "user_name": null}));
    }
}
