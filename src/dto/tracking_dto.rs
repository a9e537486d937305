use serde::Deserialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

/// Anonymous tracking identity created by the client on first visit.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterClientPayload {
    pub uid: Uuid,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub screen: Option<ScreenSize>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordEventPayload {
    pub uid: Option<Uuid>,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 64))]
    pub event_type: String,
    /// Opaque structured blob; stored verbatim, never schema-validated.
    pub metadata: Option<JsonValue>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordAnswerPayload {
    pub uid: Uuid,
    #[validate(length(min = 1))]
    pub question: String,
    pub answer: String,
    pub time: f64,
    #[serde(rename = "questionTime")]
    pub question_time: Option<f64>,
}
