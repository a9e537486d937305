use crate::dto::admin_dto::AnalyticsResponse;
use crate::error::Result;
use crate::models::analytics::{
    AnswerHoverRow, BehaviorCorrelationRow, CharacterResultRow, QuestionAnalysisRow,
    UserBehaviorRow, UserMetrics,
};
use crate::models::answer::QUIZ_RESULT_QUESTION;
use sqlx::PgPool;

/// Read-only aggregate passes over events/answers. Each query is a pure
/// function of stored data at a point in time; the passes share nothing
/// and run concurrently per request.
#[derive(Clone)]
pub struct AnalyticsService {
    pool: PgPool,
}

/// Mean gap in seconds between a user's consecutive click events. Click
/// events carry no duration of their own, so latency is derived from
/// timestamps with a window LAG.
const CLICK_SPEED_CTE: &str = "
click_speed AS (
    SELECT uid, AVG(gap) AS avg_click_speed
    FROM (
        SELECT uid,
               EXTRACT(EPOCH FROM created_at
                   - LAG(created_at) OVER (PARTITION BY uid ORDER BY created_at))::double precision AS gap
        FROM events
        WHERE type = 'click' AND uid IS NOT NULL
    ) gaps
    WHERE gap IS NOT NULL
    GROUP BY uid
)";

/// Mean hover duration (ms) per user, read from the opaque metadata blob.
/// Non-numeric or missing durations are skipped rather than failing the
/// whole pass.
const HOVER_CTE: &str = "
hover AS (
    SELECT uid, AVG((metadata->>'duration')::double precision) AS avg_hover_duration
    FROM events
    WHERE type = 'hover'
      AND uid IS NOT NULL
      AND jsonb_typeof(metadata->'duration') = 'number'
    GROUP BY uid
)";

impl AnalyticsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All six aggregate sections in one response, computed concurrently
    /// against the same pool.
    pub async fn analytics(&self) -> Result<AnalyticsResponse> {
        let (
            user_metrics,
            user_behavior,
            question_analysis,
            answer_hover_analysis,
            character_results,
            behavior_character_correlation,
        ) = tokio::try_join!(
            self.user_metrics(),
            self.user_behavior(),
            self.question_analysis(),
            self.answer_hover_analysis(),
            self.character_results(),
            self.behavior_character_correlation(),
        )?;

        Ok(AnalyticsResponse {
            user_metrics,
            user_behavior,
            question_analysis,
            answer_hover_analysis,
            character_results,
            behavior_character_correlation,
        })
    }

    /// Headline counters. `users_completed_quiz + users_not_completed`
    /// always equals `total_users` for a fixed snapshot because both are
    /// computed from the same join.
    pub async fn user_metrics(&self) -> Result<UserMetrics> {
        let metrics = sqlx::query_as::<_, UserMetrics>(
            "SELECT COUNT(*) AS total_users,
                    COUNT(an.uid) AS users_completed_quiz,
                    COUNT(*) - COUNT(an.uid) AS users_not_completed,
                    AVG(an.total_time) AS avg_time_spent
             FROM users u
             LEFT JOIN (
                 SELECT uid, SUM(time_taken) AS total_time
                 FROM answers
                 GROUP BY uid
             ) an ON an.uid = u.id",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(metrics)
    }

    /// Per-user behavioral profile; users with no timing signal at all
    /// are omitted.
    pub async fn user_behavior(&self) -> Result<Vec<UserBehaviorRow>> {
        let sql = format!(
            "WITH {click_speed},
             {hover},
             answer_time AS (
                 SELECT uid, AVG(time_taken) AS avg_answer_time
                 FROM answers
                 GROUP BY uid
             )
             SELECT u.id, u.username,
                    cs.avg_click_speed,
                    hv.avg_hover_duration,
                    ans.avg_answer_time
             FROM users u
             LEFT JOIN click_speed cs ON cs.uid = u.id
             LEFT JOIN hover hv ON hv.uid = u.id
             LEFT JOIN answer_time ans ON ans.uid = u.id
             WHERE cs.uid IS NOT NULL OR hv.uid IS NOT NULL OR ans.uid IS NOT NULL
             ORDER BY u.created_at DESC",
            click_speed = CLICK_SPEED_CTE,
            hover = HOVER_CTE,
        );
        let rows = sqlx::query_as::<_, UserBehaviorRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Per-question difficulty over non-sentinel answers. Prefers the
    /// per-question elapsed time where the client reported one.
    pub async fn question_analysis(&self) -> Result<Vec<QuestionAnalysisRow>> {
        let rows = sqlx::query_as::<_, QuestionAnalysisRow>(
            "SELECT question,
                    COUNT(*) AS total_attempts,
                    COUNT(DISTINCT uid) AS unique_users,
                    AVG(COALESCE(question_time, time_taken)) AS avg_question_time,
                    MIN(time_taken) AS min_time_spent,
                    MAX(time_taken) AS max_time_spent
             FROM answers
             WHERE question <> $1
             GROUP BY question
             ORDER BY avg_question_time DESC NULLS LAST",
        )
        .bind(QUIZ_RESULT_QUESTION)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Hover attention per answer text, read from hover event metadata.
    pub async fn answer_hover_analysis(&self) -> Result<Vec<AnswerHoverRow>> {
        let rows = sqlx::query_as::<_, AnswerHoverRow>(
            "SELECT metadata->>'answerText' AS answer,
                    COUNT(*) AS hover_count,
                    AVG((metadata->>'duration')::double precision) AS avg_hover_time
             FROM events
             WHERE type = 'hover'
               AND metadata->>'answerText' IS NOT NULL
               AND jsonb_typeof(metadata->'duration') = 'number'
             GROUP BY metadata->>'answerText'
             ORDER BY hover_count DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Outcome selection frequency: count and share of all recorded
    /// outcomes, one decimal place.
    pub async fn character_results(&self) -> Result<Vec<CharacterResultRow>> {
        let rows = sqlx::query_as::<_, CharacterResultRow>(
            "SELECT answer AS answer_type,
                    COUNT(*) AS result_count,
                    ROUND(100.0 * COUNT(*)::numeric
                        / NULLIF(SUM(COUNT(*)) OVER (), 0), 1)::double precision AS percentage
             FROM answers
             WHERE question = $1
             GROUP BY answer
             ORDER BY result_count DESC",
        )
        .bind(QUIZ_RESULT_QUESTION)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Joins per-user event aggregates with quiz outcomes: for each
    /// outcome, the mean click gap, mean hover duration and mean total
    /// answer time across the users who reached it.
    pub async fn behavior_character_correlation(&self) -> Result<Vec<BehaviorCorrelationRow>> {
        let sql = format!(
            "WITH {click_speed},
             {hover},
             totals AS (
                 SELECT uid, SUM(time_taken) AS total_time
                 FROM answers
                 WHERE question <> $1
                 GROUP BY uid
             ),
             outcomes AS (
                 SELECT uid, answer
                 FROM answers
                 WHERE question = $1
             )
             SELECT o.answer AS answer_type,
                    AVG(cs.avg_click_speed) AS avg_click_speed,
                    AVG(hv.avg_hover_duration) AS avg_hover_duration,
                    AVG(tt.total_time) AS avg_answer_time,
                    COUNT(*) AS result_count
             FROM outcomes o
             LEFT JOIN click_speed cs ON cs.uid = o.uid
             LEFT JOIN hover hv ON hv.uid = o.uid
             LEFT JOIN totals tt ON tt.uid = o.uid
             GROUP BY o.answer
             ORDER BY result_count DESC",
            click_speed = CLICK_SPEED_CTE,
            hover = HOVER_CTE,
        );
        let rows = sqlx::query_as::<_, BehaviorCorrelationRow>(&sql)
            .bind(QUIZ_RESULT_QUESTION)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
