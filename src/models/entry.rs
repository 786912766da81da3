use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Gratitude entries and affirmations share this row shape; they live in
/// separate tables and both cap at three rows per user per day.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DatedEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_date: NaiveDate,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Batch form: up to three descriptions submitted together. Blank fields
/// are ignored rather than rejected.
#[derive(Debug, Deserialize)]
pub struct CreateEntriesRequest {
    pub entry_date: Option<NaiveDate>,
    pub descriptions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_date: NaiveDate,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateJournalRequest {
    pub entry_date: Option<NaiveDate>,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateJournalRequest {
    pub content: String,
}
