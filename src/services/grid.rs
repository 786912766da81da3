use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Classification of a single day in a habit's month grid. Every day of the
/// month lands in exactly one of these.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Completed,
    NotCompleted,
    NoRecord,
}

/// First day of the month following (year, month). Used as the exclusive
/// upper bound when fetching rows.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next))
}

/// Build the total day → status mapping for one habit-month.
///
/// Days before the habit's start date are `NoRecord`; every other day is
/// `Completed` when a row with completed=true exists, otherwise
/// `NotCompleted` (an uncompleted row and a missing row look the same).
pub fn build_month_grid(
    year: i32,
    month: u32,
    start_date: NaiveDate,
    rows: &[(NaiveDate, bool)],
) -> Option<BTreeMap<u32, DayStatus>> {
    let (first, next_month) = month_bounds(year, month)?;
    let last_day = (next_month - chrono::Duration::days(1)).day();

    let completed: std::collections::HashSet<u32> = rows
        .iter()
        .filter(|(date, done)| *done && *date >= first && *date < next_month)
        .map(|(date, _)| date.day())
        .collect();

    let mut grid = BTreeMap::new();
    for day in 1..=last_day {
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let status = if date < start_date {
            DayStatus::NoRecord
        } else if completed.contains(&day) {
            DayStatus::Completed
        } else {
            DayStatus::NotCompleted
        };
        grid.insert(day, status);
    }

    Some(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_every_day_classified_exactly_once() {
        let grid = build_month_grid(2025, 1, d(2025, 1, 1), &[]).unwrap();
        assert_eq!(grid.len(), 31);
        assert!(grid.values().all(|s| *s == DayStatus::NotCompleted));
    }

    #[test]
    fn test_completed_days_match_persisted_rows() {
        // Habit started 2025-01-01, completions logged for the 10th and 11th.
        let rows = vec![(d(2025, 1, 10), true), (d(2025, 1, 11), true)];
        let grid = build_month_grid(2025, 1, d(2025, 1, 1), &rows).unwrap();

        assert_eq!(grid[&10], DayStatus::Completed);
        assert_eq!(grid[&11], DayStatus::Completed);
        let completed = grid.values().filter(|s| **s == DayStatus::Completed).count();
        assert_eq!(completed, 2);
        for day in (1..=9).chain(12..=31) {
            assert_eq!(grid[&day], DayStatus::NotCompleted, "day {}", day);
        }
    }

    #[test]
    fn test_days_before_start_are_no_record() {
        let rows = vec![(d(2025, 1, 20), true)];
        let grid = build_month_grid(2025, 1, d(2025, 1, 15), &rows).unwrap();

        for day in 1..=14 {
            assert_eq!(grid[&day], DayStatus::NoRecord);
        }
        assert_eq!(grid[&15], DayStatus::NotCompleted);
        assert_eq!(grid[&20], DayStatus::Completed);
    }

    #[test]
    fn test_uncompleted_row_counts_as_not_completed() {
        let rows = vec![(d(2025, 2, 3), false)];
        let grid = build_month_grid(2025, 2, d(2025, 1, 1), &rows).unwrap();
        assert_eq!(grid[&3], DayStatus::NotCompleted);
        assert_eq!(grid.len(), 28);
    }

    #[test]
    fn test_rows_outside_month_ignored() {
        let rows = vec![(d(2025, 1, 31), true), (d(2025, 3, 1), true)];
        let grid = build_month_grid(2025, 2, d(2025, 1, 1), &rows).unwrap();
        assert!(grid.values().all(|s| *s == DayStatus::NotCompleted));
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let grid = build_month_grid(2024, 12, d(2024, 1, 1), &[]).unwrap();
        assert_eq!(grid.len(), 31);
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert!(build_month_grid(2025, 13, d(2025, 1, 1), &[]).is_none());
    }
}
