use std::collections::HashSet;

use chrono::NaiveDate;

/// Count consecutive completed days ending at `today`, or at yesterday when
/// today has no completed record yet. The walk never crosses the habit's
/// start date.
pub fn current_streak(
    today: NaiveDate,
    start_date: NaiveDate,
    completed: &HashSet<NaiveDate>,
) -> u32 {
    let anchor = if completed.contains(&today) {
        today
    } else {
        today - chrono::Duration::days(1)
    };

    let mut streak = 0u32;
    let mut day = anchor;
    while day >= start_date && completed.contains(&day) {
        streak += 1;
        day -= chrono::Duration::days(1);
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn days(dates: &[NaiveDate]) -> HashSet<NaiveDate> {
        dates.iter().copied().collect()
    }

    #[test]
    fn test_n_consecutive_days_ending_today() {
        let today = d(2025, 1, 10);
        let completed = days(&[d(2025, 1, 8), d(2025, 1, 9), d(2025, 1, 10)]);
        assert_eq!(current_streak(today, d(2025, 1, 1), &completed), 3);
    }

    #[test]
    fn test_gap_counts_trailing_run_only() {
        let today = d(2025, 1, 10);
        let completed = days(&[
            d(2025, 1, 5),
            d(2025, 1, 6),
            // gap on the 7th
            d(2025, 1, 8),
            d(2025, 1, 9),
            d(2025, 1, 10),
        ]);
        assert_eq!(current_streak(today, d(2025, 1, 1), &completed), 3);
    }

    #[test]
    fn test_today_unlogged_anchors_on_yesterday() {
        let today = d(2025, 1, 10);
        let completed = days(&[d(2025, 1, 8), d(2025, 1, 9)]);
        assert_eq!(current_streak(today, d(2025, 1, 1), &completed), 2);
    }

    #[test]
    fn test_no_records_is_zero() {
        assert_eq!(current_streak(d(2025, 1, 10), d(2025, 1, 1), &days(&[])), 0);
    }

    #[test]
    fn test_walk_stops_at_habit_start() {
        let today = d(2025, 1, 3);
        // Rows exist before the start date; they must not extend the streak.
        let completed = days(&[
            d(2024, 12, 30),
            d(2024, 12, 31),
            d(2025, 1, 1),
            d(2025, 1, 2),
            d(2025, 1, 3),
        ]);
        assert_eq!(current_streak(today, d(2025, 1, 1), &completed), 3);
    }

    #[test]
    fn test_streak_broken_two_days_ago_is_zero() {
        let today = d(2025, 1, 10);
        let completed = days(&[d(2025, 1, 7), d(2025, 1, 8)]);
        assert_eq!(current_streak(today, d(2025, 1, 1), &completed), 0);
    }
}
