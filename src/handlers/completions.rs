use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::handlers::habits::{completed_dates, fetch_owned_habit};
use crate::models::completion::{GridQuery, HabitCompletion, StreakInfo, ToggleCompletionRequest};
use crate::services::grid::{build_month_grid, month_bounds, DayStatus};
use crate::services::streak;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MonthGrid {
    pub habit_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub days: BTreeMap<u32, DayStatus>,
    pub total_completed: usize,
}

/// Upsert-flip of a single day's completion. One row per (habit, date); the
/// unique constraint does the heavy lifting.
pub async fn toggle_completion(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
    Json(body): Json<ToggleCompletionRequest>,
) -> AppResult<Json<HabitCompletion>> {
    let habit = fetch_owned_habit(&state, auth_user.id, habit_id).await?;

    let date = body
        .completion_date
        .unwrap_or_else(|| Utc::now().date_naive());

    if date < habit.start_date {
        return Err(AppError::Validation(
            "Date is before the habit's start date".into(),
        ));
    }
    if let Some(end) = habit.end_date {
        if date > end {
            return Err(AppError::Validation(
                "Date is after the habit's end date".into(),
            ));
        }
    }

    let completion = sqlx::query_as::<_, HabitCompletion>(
        r#"
        INSERT INTO habit_completions (id, habit_id, user_id, completion_date, completed)
        VALUES ($1, $2, $3, $4, true)
        ON CONFLICT (habit_id, completion_date) DO UPDATE
            SET completed = NOT habit_completions.completed
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(habit_id)
    .bind(auth_user.id)
    .bind(date)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(completion))
}

/// Calendar grid: every day of the month classified as completed,
/// not_completed or no_record.
pub async fn get_grid(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
    Query(query): Query<GridQuery>,
) -> AppResult<Json<MonthGrid>> {
    let habit = fetch_owned_habit(&state, auth_user.id, habit_id).await?;

    let (first, next_month) = month_bounds(query.year, query.month)
        .ok_or_else(|| AppError::Validation("Invalid year/month".into()))?;

    let rows = sqlx::query_as::<_, (NaiveDate, bool)>(
        r#"
        SELECT completion_date, completed FROM habit_completions
        WHERE habit_id = $1 AND completion_date >= $2 AND completion_date < $3
        "#,
    )
    .bind(habit_id)
    .bind(first)
    .bind(next_month)
    .fetch_all(&state.db)
    .await?;

    let days = build_month_grid(query.year, query.month, habit.start_date, &rows)
        .ok_or_else(|| AppError::Validation("Invalid year/month".into()))?;
    let total_completed = days
        .values()
        .filter(|s| **s == DayStatus::Completed)
        .count();

    Ok(Json(MonthGrid {
        habit_id,
        year: query.year,
        month: query.month,
        days,
        total_completed,
    }))
}

pub async fn get_streak(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
) -> AppResult<Json<StreakInfo>> {
    let habit = fetch_owned_habit(&state, auth_user.id, habit_id).await?;

    let completed = completed_dates(&state, habit_id).await?;
    let today = Utc::now().date_naive();
    let current_streak = streak::current_streak(today, habit.start_date, &completed);

    Ok(Json(StreakInfo {
        habit_id,
        current_streak,
    }))
}
