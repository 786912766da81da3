use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::habit::{CreateHabitRequest, Habit, HabitWithStatus, UpdateHabitRequest};
use crate::services::streak;
use crate::AppState;

pub(crate) async fn fetch_owned_habit(
    state: &AppState,
    user_id: Uuid,
    habit_id: Uuid,
) -> AppResult<Habit> {
    sqlx::query_as::<_, Habit>("SELECT * FROM habits WHERE id = $1 AND user_id = $2")
        .bind(habit_id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Habit not found".into()))
}

pub(crate) async fn completed_dates(
    state: &AppState,
    habit_id: Uuid,
) -> AppResult<HashSet<NaiveDate>> {
    let dates = sqlx::query_scalar::<_, NaiveDate>(
        "SELECT completion_date FROM habit_completions WHERE habit_id = $1 AND completed = true",
    )
    .bind(habit_id)
    .fetch_all(&state.db)
    .await?;

    Ok(dates.into_iter().collect())
}

pub async fn list_habits(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<HabitWithStatus>>> {
    let today = Utc::now().date_naive();

    let habits = sqlx::query_as::<_, Habit>(
        r#"
        SELECT * FROM habits
        WHERE user_id = $1 AND is_active = true
        ORDER BY created_at ASC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    let mut result = Vec::with_capacity(habits.len());
    for habit in habits {
        let completed = completed_dates(&state, habit.id).await?;
        let current_streak = streak::current_streak(today, habit.start_date, &completed);
        let completed_today = completed.contains(&today);
        result.push(HabitWithStatus {
            habit,
            completed_today,
            current_streak,
        });
    }

    Ok(Json(result))
}

pub async fn get_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
) -> AppResult<Json<Habit>> {
    let habit = fetch_owned_habit(&state, auth_user.id, habit_id).await?;
    Ok(Json(habit))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateHabitRequest>,
) -> AppResult<Json<Habit>> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Habit name is required".into()));
    }

    let start_date = body.start_date.unwrap_or_else(|| Utc::now().date_naive());
    if let Some(end) = body.end_date {
        if end < start_date {
            return Err(AppError::Validation(
                "End date must not be before start date".into(),
            ));
        }
    }

    let habit = sqlx::query_as::<_, Habit>(
        r#"
        INSERT INTO habits (id, user_id, name, description, start_date, end_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.name.trim())
    .bind(&body.description)
    .bind(start_date)
    .bind(body.end_date)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(habit))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
    Json(body): Json<UpdateHabitRequest>,
) -> AppResult<Json<Habit>> {
    let existing = fetch_owned_habit(&state, auth_user.id, habit_id).await?;

    let start_date = body.start_date.unwrap_or(existing.start_date);
    let end_date = body.end_date.or(existing.end_date);
    if let Some(end) = end_date {
        if end < start_date {
            return Err(AppError::Validation(
                "End date must not be before start date".into(),
            ));
        }
    }

    let habit = sqlx::query_as::<_, Habit>(
        r#"
        UPDATE habits SET
            name = COALESCE($3, name),
            description = COALESCE($4, description),
            start_date = COALESCE($5, start_date),
            end_date = COALESCE($6, end_date),
            is_active = COALESCE($7, is_active),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(habit_id)
    .bind(auth_user.id)
    .bind(&body.name)
    .bind(&body.description)
    .bind(body.start_date)
    .bind(body.end_date)
    .bind(body.is_active)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(habit))
}

/// Habit delete removes its completion rows in the same transaction. The
/// schema also cascades, but the lifecycle rule is stated here rather than
/// left implicit.
pub async fn delete_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let mut tx = state.db.begin().await?;

    sqlx::query("DELETE FROM habit_completions WHERE habit_id = $1 AND user_id = $2")
        .bind(habit_id)
        .bind(auth_user.id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM habits WHERE id = $1 AND user_id = $2")
        .bind(habit_id)
        .bind(auth_user.id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Habit not found".into()));
    }

    tx.commit().await?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
