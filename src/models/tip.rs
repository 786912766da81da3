use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::mood::MoodKind;

/// Read-mostly reference content shown alongside mood entries. Serial id on
/// purpose: it is what the `[TIP_ID:n]` note tag encodes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tip {
    pub id: i64,
    pub mood: MoodKind,
    pub title: String,
    pub body: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTipRequest {
    pub mood: MoodKind,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct TipQuery {
    pub mood: Option<MoodKind>,
}
