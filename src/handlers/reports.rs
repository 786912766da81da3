use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    Extension,
};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::mood::{MoodEntry, MoodKind};
use crate::services::csv_export;
use crate::services::report::{
    resolve_range, summarize_habit, summarize_moods, HabitSummary, HabitSummaryRow, MoodSummary,
    ReportPeriod,
};
use crate::services::tip_tag;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub period: ReportPeriod,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum CsvKind {
    Habito,
    Humor,
    Gratidao,
    Afirmacao,
}

impl CsvKind {
    fn slug(self) -> &'static str {
        match self {
            CsvKind::Habito => "habito",
            CsvKind::Humor => "humor",
            CsvKind::Gratidao => "gratidao",
            CsvKind::Afirmacao => "afirmacao",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CsvQuery {
    pub tipo: CsvKind,
    pub period: ReportPeriod,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

async fn fetch_mood_rows(
    state: &AppState,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<MoodEntry>> {
    let entries = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT * FROM mood_entries
        WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3
        ORDER BY entry_date ASC
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;
    Ok(entries)
}

async fn build_habit_summary(
    state: &AppState,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<HabitSummary> {
    let habits = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, name FROM habits WHERE user_id = $1 AND is_active = true ORDER BY created_at ASC",
    )
    .bind(user_id)
    .fetch_all(&state.db)
    .await?;

    let mut rows: Vec<HabitSummaryRow> = Vec::with_capacity(habits.len());
    for (habit_id, name) in habits {
        let completions = sqlx::query_as::<_, (NaiveDate, bool)>(
            r#"
            SELECT completion_date, completed FROM habit_completions
            WHERE habit_id = $1 AND completion_date BETWEEN $2 AND $3
            "#,
        )
        .bind(habit_id)
        .bind(start)
        .bind(end)
        .fetch_all(&state.db)
        .await?;

        rows.push(summarize_habit(habit_id, name, &completions));
    }

    Ok(HabitSummary {
        start_date: start,
        end_date: end,
        habits: rows,
    })
}

pub async fn mood_report(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<MoodSummary>> {
    let today = Utc::now().date_naive();
    let (start, end) = resolve_range(query.period, today, query.start_date, query.end_date)?;

    let entries = fetch_mood_rows(&state, auth_user.id, start, end).await?;
    let rows: Vec<(NaiveDate, MoodKind)> =
        entries.iter().map(|e| (e.entry_date, e.mood)).collect();

    Ok(Json(summarize_moods(start, end, &rows)))
}

pub async fn habit_report(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<HabitSummary>> {
    let today = Utc::now().date_naive();
    let (start, end) = resolve_range(query.period, today, query.start_date, query.end_date)?;

    let summary = build_habit_summary(&state, auth_user.id, start, end).await?;
    Ok(Json(summary))
}

/// CSV export: semicolon-delimited, UTF-8 with BOM, served as a download.
pub async fn export_csv(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<CsvQuery>,
) -> AppResult<impl IntoResponse> {
    let today = Utc::now().date_naive();
    let (start, end) = resolve_range(query.period, today, query.start_date, query.end_date)?;

    let bytes = match query.tipo {
        CsvKind::Humor => {
            let entries = fetch_mood_rows(&state, auth_user.id, start, end).await?;
            let rows: Vec<Vec<String>> = entries
                .iter()
                .map(|e| {
                    vec![
                        e.entry_date.to_string(),
                        e.mood.label().to_string(),
                        tip_tag::strip(&e.note).to_string(),
                    ]
                })
                .collect();
            csv_export::render(&["Data", "Humor", "Anotação"], &rows)?
        }
        CsvKind::Habito => {
            let summary = build_habit_summary(&state, auth_user.id, start, end).await?;
            let rows: Vec<Vec<String>> = summary
                .habits
                .iter()
                .map(|h| {
                    vec![
                        h.name.clone(),
                        start.to_string(),
                        end.to_string(),
                        h.registered_days.to_string(),
                        h.completed_days.to_string(),
                        format!("{:.1}", h.percent),
                    ]
                })
                .collect();
            csv_export::render(
                &[
                    "Hábito",
                    "Início",
                    "Fim",
                    "Dias registrados",
                    "Dias concluídos",
                    "Percentual",
                ],
                &rows,
            )?
        }
        CsvKind::Gratidao | CsvKind::Afirmacao => {
            let table = match query.tipo {
                CsvKind::Gratidao => "gratitude_entries",
                _ => "affirmations",
            };
            let entries = sqlx::query_as::<_, (NaiveDate, String)>(&format!(
                r#"
                SELECT entry_date, description FROM {}
                WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3
                ORDER BY entry_date ASC, created_at ASC
                "#,
                table
            ))
            .bind(auth_user.id)
            .bind(start)
            .bind(end)
            .fetch_all(&state.db)
            .await?;

            let rows: Vec<Vec<String>> = entries
                .into_iter()
                .map(|(date, description)| vec![date.to_string(), description])
                .collect();
            csv_export::render(&["Data", "Descrição"], &rows)?
        }
    };

    let filename = format!("relatorio_{}_{}_{}.csv", query.tipo.slug(), start, end);
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid disposition header: {}", e)))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok((headers, bytes))
}
