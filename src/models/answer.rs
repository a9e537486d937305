use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Sentinel question value under which the final computed quiz outcome
/// is stored (the outcome itself lives in the `answer` column).
pub const QUIZ_RESULT_QUESTION: &str = "quiz_result";

/// One stored quiz answer. Append-only. The sentinel question
/// `quiz_result` holds the final computed outcome in `answer`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Answer {
    pub id: i64,
    pub uid: Uuid,
    pub question: String,
    pub answer: String,
    pub time_taken: f64,
    pub question_time: Option<f64>,
    pub created_at: DateTime<Utc>,
}
