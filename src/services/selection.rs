//! Выбор мест для брони. Чистые функции над отсортированным списком свободных id.

use serde::Deserialize;
use std::str::FromStr;

use crate::models::layout;

/// Как понимать «в одном ряду».
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    /// Настоящие физические ряды по 7 мест (последний — 3).
    #[default]
    Physical,
    /// Старое поведение: окно из 7 элементов списка свободных мест, без учёта рядов.
    Window,
}

impl FromStr for RowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "physical" => Ok(RowPolicy::Physical),
            "window" => Ok(RowPolicy::Window),
            other => Err(format!("unknown row policy `{}`", other)),
        }
    }
}

/// Выбрать `count` мест из `available` (возрастающие id).
///
/// Сначала проход «в одном ряду» по выбранной политике, затем запасной вариант:
/// первые `count` свободных мест подряд по id. `None`, если свободных меньше `count`.
pub fn select_seats(available: &[u32], count: usize, policy: RowPolicy) -> Option<Vec<u32>> {
    if count == 0 || available.len() < count {
        return None;
    }

    let same_row = match policy {
        RowPolicy::Window => window_pass(available, count),
        RowPolicy::Physical => physical_pass(available, count),
    };

    Some(same_row.unwrap_or_else(|| available[..count].to_vec()))
}

fn window_pass(available: &[u32], count: usize) -> Option<Vec<u32>> {
    for start in 0..available.len() {
        let end = (start + layout::ROW_WIDTH as usize).min(available.len());
        let window = &available[start..end];
        if window.len() >= count {
            return Some(window[..count].to_vec());
        }
    }
    None
}

fn physical_pass(available: &[u32], count: usize) -> Option<Vec<u32>> {
    let rows: Vec<Vec<u32>> = (0..layout::ROW_COUNT)
        .map(|row| {
            let seats = layout::row_seats(row);
            available.iter().copied().filter(|id| seats.contains(id)).collect()
        })
        .collect();

    // соседние места в одном ряду
    for row in &rows {
        if let Some(run) = adjacent_run(row, count) {
            return Some(run);
        }
    }

    // хотя бы один ряд, пусть и с промежутками
    rows.iter()
        .find(|row| row.len() >= count)
        .map(|row| row[..count].to_vec())
}

/// Первый отрезок из `count` id, идущих без пропусков.
fn adjacent_run(ids: &[u32], count: usize) -> Option<Vec<u32>> {
    ids.windows(count)
        .find(|w| w.windows(2).all(|pair| pair[1] == pair[0] + 1))
        .map(<[u32]>::to_vec)
}
