use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::tip::{CreateTipRequest, Tip, TipQuery};
use crate::AppState;

pub async fn list_tips(
    State(state): State<AppState>,
    Query(query): Query<TipQuery>,
) -> AppResult<Json<Vec<Tip>>> {
    let tips = if let Some(mood) = query.mood {
        sqlx::query_as::<_, Tip>("SELECT * FROM tips WHERE mood = $1 ORDER BY id ASC")
            .bind(mood)
            .fetch_all(&state.db)
            .await?
    } else {
        sqlx::query_as::<_, Tip>("SELECT * FROM tips ORDER BY id ASC")
            .fetch_all(&state.db)
            .await?
    };

    Ok(Json(tips))
}

pub async fn create_tip(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateTipRequest>,
) -> AppResult<Json<Tip>> {
    if body.title.trim().is_empty() || body.body.trim().is_empty() {
        return Err(AppError::Validation("Title and body are required".into()));
    }

    let tip = sqlx::query_as::<_, Tip>(
        r#"
        INSERT INTO tips (mood, title, body, created_by)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(body.mood)
    .bind(body.title.trim())
    .bind(body.body.trim())
    .bind(auth_user.id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(tip))
}

/// Only the creator may delete a tip; anyone else sees the same generic 404.
pub async fn delete_tip(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(tip_id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM tips WHERE id = $1 AND created_by = $2")
        .bind(tip_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Tip not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
