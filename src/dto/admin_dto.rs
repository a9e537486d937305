use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::models::analytics::{
    AnswerHoverRow, AnswerStats, BehaviorCorrelationRow, CharacterResultRow, EventCountRow,
    QuestionAnalysisRow, UserActivityRow, UserBehaviorRow, UserMetrics,
};
use crate::models::answer::Answer;

/// Accepts RFC 3339 timestamps and the bare `YYYY-MM-DD` the dashboard's
/// date inputs produce (taken as midnight UTC).
pub fn parse_flexible_date(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    Err(format!("Invalid date value: {}", raw))
}

fn de_flexible_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => parse_flexible_date(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Filter/sort/page parameters of the admin user listing. Every filter is
/// optional; absent means unconstrained. Param names are camelCase because
/// the admin dashboard sends them that way.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    #[serde(default, deserialize_with = "de_flexible_date")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_flexible_date")]
    pub end_date: Option<DateTime<Utc>>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub completed_quiz: Option<bool>,
    pub min_events: Option<i64>,
    pub max_events: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_count: i64,
    pub limit: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total_count: i64) -> Self {
        let total_pages = if limit > 0 {
            ((total_count as f64) / (limit as f64)).ceil() as i64
        } else {
            0
        };
        Self {
            current_page: page,
            total_pages,
            total_count,
            limit,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserActivityRow>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub user_metrics: UserMetrics,
    pub user_behavior: Vec<UserBehaviorRow>,
    pub question_analysis: Vec<QuestionAnalysisRow>,
    pub answer_hover_analysis: Vec<AnswerHoverRow>,
    pub character_results: Vec<CharacterResultRow>,
    pub behavior_character_correlation: Vec<BehaviorCorrelationRow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListQuery {
    #[serde(default, deserialize_with = "de_flexible_date")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_flexible_date")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub group_by: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCountsResponse {
    pub group_by: String,
    pub counts: Vec<EventCountRow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerListQuery {
    #[serde(default, deserialize_with = "de_flexible_date")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_flexible_date")]
    pub end_date: Option<DateTime<Utc>>,
    pub question: Option<String>,
    pub uid: Option<Uuid>,
    /// When false, sentinel outcome rows are excluded from the listing.
    pub include_results: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AnswerListResponse {
    pub answers: Vec<Answer>,
    pub stats: AnswerStats,
    pub pagination: Pagination,
}
