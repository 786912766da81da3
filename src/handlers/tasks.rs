use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::task::{
    CreateCategoryRequest, CreateTaskRequest, Task, TaskCategory, UpdateTaskRequest,
};
use crate::AppState;

async fn verify_category(
    state: &AppState,
    user_id: Uuid,
    category_id: Uuid,
) -> AppResult<()> {
    sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM task_categories WHERE id = $1 AND user_id = $2",
    )
    .bind(category_id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Category not found".into()))?;
    Ok(())
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Task>>> {
    let tasks = sqlx::query_as::<_, Task>(
        r#"
        SELECT * FROM tasks
        WHERE user_id = $1
        ORDER BY completed ASC, due_date ASC NULLS LAST, created_at ASC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateTaskRequest>,
) -> AppResult<Json<Task>> {
    if body.title.trim().is_empty() {
        return Err(AppError::Validation("Task title is required".into()));
    }
    if let Some(category_id) = body.category_id {
        verify_category(&state, auth_user.id, category_id).await?;
    }

    let task = sqlx::query_as::<_, Task>(
        r#"
        INSERT INTO tasks (id, user_id, category_id, title, due_date, priority)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.category_id)
    .bind(body.title.trim())
    .bind(body.due_date)
    .bind(body.priority.unwrap_or_default())
    .fetch_one(&state.db)
    .await?;

    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(task_id): Path<Uuid>,
    Json(body): Json<UpdateTaskRequest>,
) -> AppResult<Json<Task>> {
    if let Some(category_id) = body.category_id {
        verify_category(&state, auth_user.id, category_id).await?;
    }

    let task = sqlx::query_as::<_, Task>(
        r#"
        UPDATE tasks SET
            title = COALESCE($3, title),
            due_date = COALESCE($4, due_date),
            priority = COALESCE($5, priority),
            category_id = COALESCE($6, category_id),
            completed = COALESCE($7, completed),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(task_id)
    .bind(auth_user.id)
    .bind(&body.title)
    .bind(body.due_date)
    .bind(body.priority)
    .bind(body.category_id)
    .bind(body.completed)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Task not found".into()))?;

    Ok(Json(task))
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(task_id): Path<Uuid>,
) -> AppResult<Json<Task>> {
    let task = sqlx::query_as::<_, Task>(
        r#"
        UPDATE tasks SET completed = NOT completed, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(task_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Task not found".into()))?;

    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(task_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<TaskCategory>>> {
    let categories = sqlx::query_as::<_, TaskCategory>(
        "SELECT * FROM task_categories WHERE user_id = $1 ORDER BY name ASC",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateCategoryRequest>,
) -> AppResult<Json<TaskCategory>> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Category name is required".into()));
    }

    let category = sqlx::query_as::<_, TaskCategory>(
        r#"
        INSERT INTO task_categories (id, user_id, name)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.name.trim())
    .fetch_one(&state.db)
    .await?;

    Ok(Json(category))
}

/// Deleting a category detaches its tasks (category_id set to NULL by the
/// schema), it never deletes them.
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM task_categories WHERE id = $1 AND user_id = $2")
        .bind(category_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Category not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
