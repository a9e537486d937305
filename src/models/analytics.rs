use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One row of the admin user listing: identity plus per-user aggregates
/// computed over events and answers.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserActivityRow {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub created_at: DateTime<Utc>,
    pub total_events: i64,
    pub click_count: i64,
    pub hover_count: i64,
    pub answers_count: i64,
    pub avg_answer_time: Option<f64>,
    pub total_time_spent: Option<f64>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserMetrics {
    pub total_users: i64,
    pub users_completed_quiz: i64,
    pub users_not_completed: i64,
    pub avg_time_spent: Option<f64>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserBehaviorRow {
    pub id: Uuid,
    pub username: Option<String>,
    pub avg_click_speed: Option<f64>,
    pub avg_hover_duration: Option<f64>,
    pub avg_answer_time: Option<f64>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct QuestionAnalysisRow {
    pub question: String,
    pub total_attempts: i64,
    pub unique_users: i64,
    pub avg_question_time: Option<f64>,
    pub min_time_spent: Option<f64>,
    pub max_time_spent: Option<f64>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AnswerHoverRow {
    pub answer: String,
    pub hover_count: i64,
    pub avg_hover_time: Option<f64>,
}

/// Outcome selection frequency; `answer_type` is the outcome value from
/// the sentinel answer rows.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CharacterResultRow {
    pub answer_type: String,
    pub result_count: i64,
    pub percentage: Option<f64>,
}

/// Per-outcome behavioral summary: mean click gap, mean hover duration
/// and mean total answer time of the users who reached the outcome.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BehaviorCorrelationRow {
    pub answer_type: String,
    pub avg_click_speed: Option<f64>,
    pub avg_hover_duration: Option<f64>,
    pub avg_answer_time: Option<f64>,
    pub result_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventCountRow {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AnswerStats {
    pub total_answers: i64,
    pub unique_users: i64,
    pub avg_time_taken: Option<f64>,
    pub min_time_taken: Option<f64>,
    pub max_time_taken: Option<f64>,
}
