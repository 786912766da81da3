use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::entry::DateRangeQuery;
use crate::models::mood::{CreateMoodRequest, MoodEntry, MoodEntryView, UpdateMoodRequest};
use crate::models::tip::Tip;
use crate::services::tip_tag;
use crate::AppState;

async fn fetch_tip(state: &AppState, tip_id: i64) -> AppResult<Option<Tip>> {
    let tip = sqlx::query_as::<_, Tip>("SELECT * FROM tips WHERE id = $1")
        .bind(tip_id)
        .fetch_optional(&state.db)
        .await?;
    Ok(tip)
}

async fn entry_view(state: &AppState, entry: MoodEntry) -> AppResult<MoodEntryView> {
    let (tip_id, note) = tip_tag::decode(&entry.note);
    let tip = match tip_id {
        Some(id) => fetch_tip(state, id).await?,
        None => None,
    };
    Ok(MoodEntryView {
        id: entry.id,
        entry_date: entry.entry_date,
        mood: entry.mood,
        note: note.to_string(),
        tip,
    })
}

/// Merge an incoming note with the stored one. A mood-category change
/// discards the persisted tip tag, forcing re-rotation on the next view;
/// otherwise the tag is carried over verbatim around the new text.
fn merge_note(stored: &str, incoming: &str, mood_changed: bool) -> String {
    let user_text = tip_tag::strip(incoming);
    if mood_changed {
        return user_text.to_string();
    }
    match tip_tag::decode(stored).0 {
        Some(tip_id) => tip_tag::encode(tip_id, user_text),
        None => user_text.to_string(),
    }
}

pub async fn list_moods(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<Vec<MoodEntryView>>> {
    let start = query
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(30));
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());

    let entries = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT * FROM mood_entries
        WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3
        ORDER BY entry_date DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    let mut views = Vec::with_capacity(entries.len());
    for entry in entries {
        views.push(entry_view(&state, entry).await?);
    }

    Ok(Json(views))
}

pub async fn create_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateMoodRequest>,
) -> AppResult<Json<MoodEntryView>> {
    let entry_date = body.entry_date.unwrap_or_else(|| Utc::now().date_naive());
    // Client notes never carry system tags.
    let note = tip_tag::strip(body.note.as_deref().unwrap_or("")).to_string();

    let entry = sqlx::query_as::<_, MoodEntry>(
        r#"
        INSERT INTO mood_entries (id, user_id, entry_date, mood, note)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(entry_date)
    .bind(body.mood)
    .bind(&note)
    .fetch_one(&state.db)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "Mood already recorded for this date"))?;

    let view = entry_view(&state, entry).await?;
    Ok(Json(view))
}

/// Today's entry, with tip rotation: when no tip is persisted yet (or the
/// persisted id no longer resolves), pick an unseen tip for the entry's
/// mood, store its id in the note tag, and return it.
pub async fn today_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<MoodEntryView>> {
    let today = Utc::now().date_naive();

    let entry = sqlx::query_as::<_, MoodEntry>(
        "SELECT * FROM mood_entries WHERE user_id = $1 AND entry_date = $2",
    )
    .bind(auth_user.id)
    .bind(today)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("No mood entry for today".into()))?;

    let (tagged_id, user_note) = tip_tag::decode(&entry.note);

    if let Some(id) = tagged_id {
        if let Some(tip) = fetch_tip(&state, id).await? {
            return Ok(Json(MoodEntryView {
                id: entry.id,
                entry_date: entry.entry_date,
                mood: entry.mood,
                note: user_note.to_string(),
                tip: Some(tip),
            }));
        }
        // Tip row is gone; fall through and rotate a fresh one.
    }

    let candidates = sqlx::query_scalar::<_, i64>("SELECT id FROM tips WHERE mood = $1")
        .bind(entry.mood)
        .fetch_all(&state.db)
        .await?;

    let chosen = state
        .tip_sessions
        .rotate(auth_user.id, entry.mood, &candidates)
        .await;

    let (stored_note, tip) = match chosen {
        Some(tip_id) => (
            tip_tag::encode(tip_id, user_note),
            fetch_tip(&state, tip_id).await?,
        ),
        // No tips in the catalog; also drops a dangling tag, if any.
        None => (user_note.to_string(), None),
    };

    if stored_note != entry.note {
        sqlx::query("UPDATE mood_entries SET note = $2, updated_at = NOW() WHERE id = $1")
            .bind(entry.id)
            .bind(&stored_note)
            .execute(&state.db)
            .await?;
    }

    Ok(Json(MoodEntryView {
        id: entry.id,
        entry_date: entry.entry_date,
        mood: entry.mood,
        note: tip_tag::strip(&stored_note).to_string(),
        tip,
    }))
}

pub async fn update_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
    Json(body): Json<UpdateMoodRequest>,
) -> AppResult<Json<MoodEntryView>> {
    let existing = sqlx::query_as::<_, MoodEntry>(
        "SELECT * FROM mood_entries WHERE id = $1 AND user_id = $2",
    )
    .bind(entry_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Mood entry not found".into()))?;

    let mood = body.mood.unwrap_or(existing.mood);
    let mood_changed = mood != existing.mood;
    let incoming = match &body.note {
        Some(note) => note.as_str(),
        None => tip_tag::strip(&existing.note),
    };
    let note = merge_note(&existing.note, incoming, mood_changed);

    let entry = sqlx::query_as::<_, MoodEntry>(
        r#"
        UPDATE mood_entries SET mood = $3, note = $4, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(entry_id)
    .bind(auth_user.id)
    .bind(mood)
    .bind(&note)
    .fetch_one(&state.db)
    .await?;

    let view = entry_view(&state, entry).await?;
    Ok(Json(view))
}

pub async fn delete_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM mood_entries WHERE id = $1 AND user_id = $2")
        .bind(entry_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Mood entry not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[cfg(test)]
mod tests {
    use super::merge_note;

    #[test]
    fn test_category_change_discards_tag() {
        let merged = merge_note("[TIP_ID:10] old text", "new text", true);
        assert_eq!(merged, "new text");
    }

    #[test]
    fn test_unchanged_category_preserves_tag() {
        let merged = merge_note("[TIP_ID:10] old text", "new text", false);
        assert_eq!(merged, "[TIP_ID:10] new text");
    }

    #[test]
    fn test_untagged_note_stays_untagged() {
        let merged = merge_note("old text", "new text", false);
        assert_eq!(merged, "new text");
    }

    #[test]
    fn test_client_supplied_tag_is_stripped() {
        let merged = merge_note("plain", "[TIP_ID:99] forged", true);
        assert_eq!(merged, "forged");
    }
}
