//! Геометрия вагона: 12 рядов по 7 мест, в последнем ряду только 3 (78, 79, 80).
//!
//! Раскладка не хранится, а вычисляется из id места.

use std::ops::RangeInclusive;

pub const TOTAL_SEATS: u32 = 80;
pub const ROW_WIDTH: u32 = 7;
pub const ROW_COUNT: u32 = 12;

pub fn is_valid_seat_id(id: u32) -> bool {
    (1..=TOTAL_SEATS).contains(&id)
}

/// Номер ряда (с нуля) для места, `None` для несуществующего id.
pub fn row_of(id: u32) -> Option<u32> {
    is_valid_seat_id(id).then(|| (id - 1) / ROW_WIDTH)
}

/// Диапазон id мест в физическом ряду. Для ряда за пределами вагона диапазон пустой.
pub fn row_seats(row: u32) -> RangeInclusive<u32> {
    if row >= ROW_COUNT {
        return RangeInclusive::new(1, 0);
    }
    let first = row * ROW_WIDTH + 1;
    let last = (first + ROW_WIDTH - 1).min(TOTAL_SEATS);
    first..=last
}
