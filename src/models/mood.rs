use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::tip::Tip;

/// Mood categories. Values double as the tip-catalog categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "mood_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MoodKind {
    Feliz,
    Triste,
    Ansioso,
    Calmo,
    Irritado,
}

impl MoodKind {
    pub const ALL: [MoodKind; 5] = [
        MoodKind::Feliz,
        MoodKind::Triste,
        MoodKind::Ansioso,
        MoodKind::Calmo,
        MoodKind::Irritado,
    ];

    /// Display label, used in CSV exports.
    pub fn label(&self) -> &'static str {
        match self {
            MoodKind::Feliz => "Feliz",
            MoodKind::Triste => "Triste",
            MoodKind::Ansioso => "Ansioso",
            MoodKind::Calmo => "Calmo",
            MoodKind::Irritado => "Irritado",
        }
    }
}

/// One entry per user per day. `note` is the stored text and may carry the
/// system tip tag prefix, so it is stripped before reaching clients — see
/// `services::tip_tag`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_date: NaiveDate,
    pub mood: MoodKind,
    #[serde(skip_serializing)]
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMoodRequest {
    pub entry_date: Option<NaiveDate>,
    pub mood: MoodKind,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMoodRequest {
    pub mood: Option<MoodKind>,
    pub note: Option<String>,
}

/// Client-facing view: the entry with the tag stripped from the note, plus
/// the resolved tip when one is persisted.
#[derive(Debug, Serialize)]
pub struct MoodEntryView {
    pub id: Uuid,
    pub entry_date: NaiveDate,
    pub mood: MoodKind,
    pub note: String,
    pub tip: Option<Tip>,
}
