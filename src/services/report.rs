use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::mood::MoodKind;

/// Date-range selector for report endpoints.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    /// Trailing 7 days ending today.
    Semana,
    /// Trailing 14 days ending today.
    Quinzena,
    /// Current calendar month, first day through today.
    Mes,
    /// Explicit start/end dates.
    Custom,
}

pub fn resolve_range(
    period: ReportPeriod,
    today: NaiveDate,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> AppResult<(NaiveDate, NaiveDate)> {
    match period {
        ReportPeriod::Semana => Ok((today - chrono::Duration::days(6), today)),
        ReportPeriod::Quinzena => Ok((today - chrono::Duration::days(13), today)),
        ReportPeriod::Mes => {
            let first = today.with_day(1).unwrap_or(today);
            Ok((first, today))
        }
        ReportPeriod::Custom => {
            let (start, end) = match (start, end) {
                (Some(s), Some(e)) => (s, e),
                _ => {
                    return Err(AppError::Validation(
                        "Custom period requires start_date and end_date".into(),
                    ))
                }
            };
            if start > end {
                return Err(AppError::Validation(
                    "start_date must not be after end_date".into(),
                ));
            }
            Ok((start, end))
        }
    }
}

/// Percentage of `count` over `total`, rounded to one decimal. Yields 0.0
/// when nothing is registered.
pub fn percent(count: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    ((count as f64 / total as f64) * 1000.0).round() / 10.0
}

#[derive(Debug, Serialize)]
pub struct MoodDayRow {
    pub date: NaiveDate,
    pub mood: MoodKind,
}

#[derive(Debug, Serialize)]
pub struct MoodTotal {
    pub mood: MoodKind,
    pub count: i64,
    pub percent: f64,
}

#[derive(Debug, Serialize)]
pub struct MoodSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Days in the range with a registered entry.
    pub total_days: i64,
    pub days: Vec<MoodDayRow>,
    pub totals: Vec<MoodTotal>,
}

/// Group mood entries by day and compute per-category totals. The
/// percentage base is the number of registered days, not the range length.
pub fn summarize_moods(
    start_date: NaiveDate,
    end_date: NaiveDate,
    entries: &[(NaiveDate, MoodKind)],
) -> MoodSummary {
    let total_days = entries.len() as i64;

    let days = entries
        .iter()
        .map(|(date, mood)| MoodDayRow {
            date: *date,
            mood: *mood,
        })
        .collect();

    let totals = MoodKind::ALL
        .iter()
        .map(|kind| {
            let count = entries.iter().filter(|(_, mood)| mood == kind).count() as i64;
            MoodTotal {
                mood: *kind,
                count,
                percent: percent(count, total_days),
            }
        })
        .collect();

    MoodSummary {
        start_date,
        end_date,
        total_days,
        days,
        totals,
    }
}

#[derive(Debug, Serialize)]
pub struct HabitSummaryRow {
    pub habit_id: Uuid,
    pub name: String,
    /// Days in the range with any completion row for this habit.
    pub registered_days: i64,
    pub completed_days: i64,
    pub percent: f64,
}

#[derive(Debug, Serialize)]
pub struct HabitSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub habits: Vec<HabitSummaryRow>,
}

pub fn summarize_habit(habit_id: Uuid, name: String, rows: &[(NaiveDate, bool)]) -> HabitSummaryRow {
    let registered_days = rows.len() as i64;
    let completed_days = rows.iter().filter(|(_, done)| *done).count() as i64;
    HabitSummaryRow {
        habit_id,
        name,
        registered_days,
        completed_days,
        percent: percent(completed_days, registered_days),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_percent_rounds_to_one_decimal() {
        assert_eq!(percent(2, 3), 66.7);
        assert_eq!(percent(1, 3), 33.3);
        assert_eq!(percent(3, 3), 100.0);
    }

    #[test]
    fn test_percent_zero_division_guarded() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(5, 0), 0.0);
    }

    #[test]
    fn test_semana_is_trailing_seven_days() {
        let (start, end) = resolve_range(ReportPeriod::Semana, d(2025, 3, 10), None, None).unwrap();
        assert_eq!(start, d(2025, 3, 4));
        assert_eq!(end, d(2025, 3, 10));
    }

    #[test]
    fn test_quinzena_is_trailing_fourteen_days() {
        let (start, end) =
            resolve_range(ReportPeriod::Quinzena, d(2025, 3, 14), None, None).unwrap();
        assert_eq!(start, d(2025, 3, 1));
        assert_eq!(end, d(2025, 3, 14));
    }

    #[test]
    fn test_mes_starts_on_the_first() {
        let (start, end) = resolve_range(ReportPeriod::Mes, d(2025, 3, 14), None, None).unwrap();
        assert_eq!(start, d(2025, 3, 1));
        assert_eq!(end, d(2025, 3, 14));
    }

    #[test]
    fn test_custom_requires_both_bounds() {
        let err = resolve_range(ReportPeriod::Custom, d(2025, 3, 14), Some(d(2025, 3, 1)), None);
        assert!(err.is_err());
    }

    #[test]
    fn test_custom_rejects_inverted_range() {
        let err = resolve_range(
            ReportPeriod::Custom,
            d(2025, 3, 14),
            Some(d(2025, 3, 10)),
            Some(d(2025, 3, 1)),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_mood_summary_totals_and_percentages() {
        let entries = vec![
            (d(2025, 1, 1), MoodKind::Triste),
            (d(2025, 1, 2), MoodKind::Triste),
            (d(2025, 1, 3), MoodKind::Feliz),
        ];
        let summary = summarize_moods(d(2025, 1, 1), d(2025, 1, 31), &entries);

        assert_eq!(summary.total_days, 3);
        assert_eq!(summary.days.len(), 3);

        let triste = summary
            .totals
            .iter()
            .find(|t| t.mood == MoodKind::Triste)
            .unwrap();
        assert_eq!(triste.count, 2);
        assert_eq!(triste.percent, 66.7);

        let calmo = summary
            .totals
            .iter()
            .find(|t| t.mood == MoodKind::Calmo)
            .unwrap();
        assert_eq!(calmo.count, 0);
        assert_eq!(calmo.percent, 0.0);
    }

    #[test]
    fn test_empty_mood_summary_has_zero_percentages() {
        let summary = summarize_moods(d(2025, 1, 1), d(2025, 1, 31), &[]);
        assert_eq!(summary.total_days, 0);
        assert!(summary.totals.iter().all(|t| t.percent == 0.0));
    }

    #[test]
    fn test_habit_summary_counts_completed_rows_only() {
        let rows = vec![
            (d(2025, 1, 1), true),
            (d(2025, 1, 2), false),
            (d(2025, 1, 3), true),
        ];
        let row = summarize_habit(Uuid::new_v4(), "Ler".into(), &rows);
        assert_eq!(row.registered_days, 3);
        assert_eq!(row.completed_days, 2);
        assert_eq!(row.percent, 66.7);
    }
}
