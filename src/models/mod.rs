pub mod layout;
pub mod seat;

pub use seat::{InvalidSeat, Seat, SeatRecord, SeatStatus};
