use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::entry::{CreateEntriesRequest, DateRangeQuery, DatedEntry};
use crate::AppState;

/// Gratitude entries and affirmations share one implementation; only the
/// table differs.
#[derive(Clone, Copy)]
enum EntryTable {
    Gratitude,
    Affirmation,
}

impl EntryTable {
    fn name(self) -> &'static str {
        match self {
            EntryTable::Gratitude => "gratitude_entries",
            EntryTable::Affirmation => "affirmations",
        }
    }
}

const MAX_PER_DAY: i64 = 3;

/// Trim and drop blank descriptions; submitting a half-filled form is fine.
fn non_blank(descriptions: &[String]) -> Vec<&str> {
    descriptions
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .collect()
}

/// Create up to three entries for one day in a single transaction. Blank
/// descriptions are ignored rather than rejected; either every remaining
/// row is created or none are.
async fn create_batch(
    state: &AppState,
    user_id: Uuid,
    table: EntryTable,
    body: CreateEntriesRequest,
) -> AppResult<Vec<DatedEntry>> {
    let entry_date = body.entry_date.unwrap_or_else(|| Utc::now().date_naive());

    let descriptions = non_blank(&body.descriptions);

    if descriptions.is_empty() {
        return Err(AppError::Validation(
            "At least one description is required".into(),
        ));
    }

    let existing = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) FROM {} WHERE user_id = $1 AND entry_date = $2",
        table.name()
    ))
    .bind(user_id)
    .bind(entry_date)
    .fetch_one(&state.db)
    .await?;

    if existing + descriptions.len() as i64 > MAX_PER_DAY {
        return Err(AppError::Validation(format!(
            "Limit of {} entries per day",
            MAX_PER_DAY
        )));
    }

    let insert_sql = format!(
        r#"
        INSERT INTO {} (id, user_id, entry_date, description)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
        table.name()
    );

    let mut tx = state.db.begin().await?;
    let mut created = Vec::with_capacity(descriptions.len());
    for description in descriptions {
        let entry = sqlx::query_as::<_, DatedEntry>(&insert_sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(entry_date)
            .bind(description)
            .fetch_one(&mut *tx)
            .await?;
        created.push(entry);
    }
    tx.commit().await?;

    Ok(created)
}

async fn list_range(
    state: &AppState,
    user_id: Uuid,
    table: EntryTable,
    query: DateRangeQuery,
) -> AppResult<Vec<DatedEntry>> {
    let start = query
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(30));
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());

    let entries = sqlx::query_as::<_, DatedEntry>(&format!(
        r#"
        SELECT * FROM {}
        WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3
        ORDER BY entry_date DESC, created_at ASC
        "#,
        table.name()
    ))
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    Ok(entries)
}

async fn delete_entry(
    state: &AppState,
    user_id: Uuid,
    table: EntryTable,
    entry_id: Uuid,
) -> AppResult<()> {
    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE id = $1 AND user_id = $2",
        table.name()
    ))
    .bind(entry_id)
    .bind(user_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Entry not found".into()));
    }
    Ok(())
}

pub async fn create_gratitude(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateEntriesRequest>,
) -> AppResult<Json<Vec<DatedEntry>>> {
    let created = create_batch(&state, auth_user.id, EntryTable::Gratitude, body).await?;
    Ok(Json(created))
}

pub async fn list_gratitude(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<Vec<DatedEntry>>> {
    let entries = list_range(&state, auth_user.id, EntryTable::Gratitude, query).await?;
    Ok(Json(entries))
}

pub async fn delete_gratitude(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    delete_entry(&state, auth_user.id, EntryTable::Gratitude, entry_id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn create_affirmations(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateEntriesRequest>,
) -> AppResult<Json<Vec<DatedEntry>>> {
    let created = create_batch(&state, auth_user.id, EntryTable::Affirmation, body).await?;
    Ok(Json(created))
}

pub async fn list_affirmations(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<Vec<DatedEntry>>> {
    let entries = list_range(&state, auth_user.id, EntryTable::Affirmation, query).await?;
    Ok(Json(entries))
}

pub async fn delete_affirmation(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    delete_entry(&state, auth_user.id, EntryTable::Affirmation, entry_id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[cfg(test)]
mod tests {
    use super::non_blank;

    #[test]
    fn test_blank_descriptions_are_ignored() {
        let input = vec!["G1".to_string(), "G2".to_string(), "".to_string()];
        assert_eq!(non_blank(&input), vec!["G1", "G2"]);
    }

    #[test]
    fn test_whitespace_only_counts_as_blank() {
        let input = vec!["  ".to_string(), "\t".to_string(), " ok ".to_string()];
        assert_eq!(non_blank(&input), vec!["ok"]);
    }

    #[test]
    fn test_all_blank_yields_empty() {
        let input = vec!["".to_string(), " ".to_string()];
        assert!(non_blank(&input).is_empty());
    }
}
