use crate::dto::tracking_dto::{RecordAnswerPayload, RecordEventPayload, RegisterClientPayload};
use crate::error::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Two-step user identity resolution for event recording: an explicit
/// identifier wins, otherwise the identity recovered from a verified
/// session token, otherwise anonymous.
pub fn resolve_user_id(explicit: Option<Uuid>, from_token: Option<Uuid>) -> Option<Uuid> {
    explicit.or(from_token)
}

#[derive(Clone)]
pub struct TrackingService {
    pool: PgPool,
}

impl TrackingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stores an anonymous tracking identity. Re-registration of a known
    /// uid is a no-op rather than an error; clients re-send on reload.
    pub async fn register_client(&self, payload: RegisterClientPayload) -> Result<()> {
        let (width, height) = payload
            .screen
            .map(|s| (Some(s.width), Some(s.height)))
            .unwrap_or((None, None));
        sqlx::query(
            "INSERT INTO users (id, browser, os, screen_width, screen_height)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(payload.uid)
        .bind(payload.browser)
        .bind(payload.os)
        .bind(width)
        .bind(height)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// One synchronous row insert; metadata is stored verbatim. `uid` may
    /// be null when neither the body nor a valid token named a user.
    pub async fn record_event(&self, uid: Option<Uuid>, payload: RecordEventPayload) -> Result<()> {
        sqlx::query("INSERT INTO events (uid, type, metadata) VALUES ($1, $2, $3)")
            .bind(uid)
            .bind(payload.event_type)
            .bind(payload.metadata)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn record_answer(&self, payload: RecordAnswerPayload) -> Result<()> {
        sqlx::query(
            "INSERT INTO answers (uid, question, answer, time_taken, question_time)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(payload.uid)
        .bind(payload.question)
        .bind(payload.answer)
        .bind(payload.time)
        .bind(payload.question_time)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_uid_wins_over_token() {
        let explicit = Uuid::new_v4();
        let token = Uuid::new_v4();
        assert_eq!(resolve_user_id(Some(explicit), Some(token)), Some(explicit));
    }

    #[test]
    fn token_uid_used_when_body_omits_it() {
        let token = Uuid::new_v4();
        assert_eq!(resolve_user_id(None, Some(token)), Some(token));
    }

    #[test]
    fn absent_both_is_anonymous() {
        assert_eq!(resolve_user_id(None, None), None);
    }
}
