use crate::bind_sql_values;
use crate::dto::admin_dto::{
    AnswerListQuery, AnswerListResponse, EventCountsResponse, EventListQuery, Pagination,
    UserListQuery, UserListResponse,
};
use crate::error::{Error, Result};
use crate::models::analytics::{AnswerStats, EventCountRow, UserActivityRow};
use crate::models::answer::{Answer, QUIZ_RESULT_QUESTION};
use crate::services::filter::{ConditionSet, SqlValue};
use sqlx::PgPool;

/// Filtered, sorted, paginated aggregate views for the admin dashboard.
#[derive(Clone)]
pub struct ReportService {
    pool: PgPool,
}

/// sortBy allow-list: request name -> ORDER BY expression. Anything else
/// falls back to the default (most recently created first).
const USER_SORT_COLUMNS: &[(&str, &str)] = &[
    ("created_at", "u.created_at"),
    ("username", "u.username"),
    ("total_events", "total_events"),
    ("click_count", "click_count"),
    ("hover_count", "hover_count"),
    ("answers_count", "answers_count"),
    ("avg_answer_time", "avg_answer_time"),
    ("total_time_spent", "total_time_spent"),
];

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// Per-user pre-aggregated joins. Aggregating in subqueries keeps the
/// event and answer averages undistorted (a flat three-way join would
/// repeat rows) and lets the event-count bound be a plain predicate with
/// post-aggregation semantics.
const USER_ACTIVITY_FROM: &str = "
FROM users u
LEFT JOIN (
    SELECT uid,
           COUNT(*) AS total_events,
           COUNT(*) FILTER (WHERE type = 'click') AS click_count,
           COUNT(*) FILTER (WHERE type = 'hover') AS hover_count
    FROM events
    GROUP BY uid
) ev ON ev.uid = u.id
LEFT JOIN (
    SELECT uid,
           COUNT(*) AS answers_count,
           AVG(time_taken) AS avg_answer_time,
           SUM(time_taken) AS total_time_spent
    FROM answers
    GROUP BY uid
) an ON an.uid = u.id";

fn user_conditions(query: &UserListQuery) -> ConditionSet {
    let mut conds = ConditionSet::new();
    if let Some(start) = query.start_date {
        conds.push("u.created_at >= $?", SqlValue::Timestamp(start));
    }
    if let Some(end) = query.end_date {
        conds.push("u.created_at <= $?", SqlValue::Timestamp(end));
    }
    if let Some(ref browser) = query.browser {
        conds.push("u.browser ILIKE $?", SqlValue::Text(format!("%{}%", browser)));
    }
    if let Some(ref os) = query.os {
        conds.push("u.os ILIKE $?", SqlValue::Text(format!("%{}%", os)));
    }
    match query.completed_quiz {
        Some(true) => conds.push_unbound("COALESCE(an.answers_count, 0) > 0"),
        Some(false) => conds.push_unbound("COALESCE(an.answers_count, 0) = 0"),
        None => {}
    }
    if let Some(min) = query.min_events {
        conds.push("COALESCE(ev.total_events, 0) >= $?", SqlValue::Int(min));
    }
    if let Some(max) = query.max_events {
        conds.push("COALESCE(ev.total_events, 0) <= $?", SqlValue::Int(max));
    }
    conds
}

fn user_order_clause(sort_by: Option<&str>, sort_order: Option<&str>) -> String {
    let column = sort_by
        .and_then(|name| USER_SORT_COLUMNS.iter().find(|(key, _)| *key == name))
        .map(|(_, expr)| *expr)
        .unwrap_or("u.created_at");
    let direction = match sort_order {
        Some(order) if order.eq_ignore_ascii_case("asc") => "ASC",
        _ => "DESC",
    };
    // Unique tiebreaker: ties on the sort key are routine (every
    // zero-event user ties on the aggregates), and without a total order
    // the per-page LIMIT/OFFSET queries may disagree on row placement.
    format!("ORDER BY {} {} NULLS LAST, u.id", column, direction)
}

fn page_params(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, limit, (page - 1) * limit)
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One row per user with computed aggregates, plus a total count over
    /// the same filtered set for pagination.
    pub async fn list_users(&self, query: UserListQuery) -> Result<UserListResponse> {
        let (page, limit, offset) = page_params(query.page, query.limit);
        let conds = user_conditions(&query);
        let order = user_order_clause(query.sort_by.as_deref(), query.sort_order.as_deref());

        let rows_sql = format!(
            "SELECT u.id, u.username, u.email, u.browser, u.os, u.created_at,
                    COALESCE(ev.total_events, 0) AS total_events,
                    COALESCE(ev.click_count, 0) AS click_count,
                    COALESCE(ev.hover_count, 0) AS hover_count,
                    COALESCE(an.answers_count, 0) AS answers_count,
                    an.avg_answer_time,
                    an.total_time_spent
             {from}
             {where_clause}
             {order}
             LIMIT ${limit_idx} OFFSET ${offset_idx}",
            from = USER_ACTIVITY_FROM,
            where_clause = conds.where_sql(),
            order = order,
            limit_idx = conds.bind_count() + 1,
            offset_idx = conds.bind_count() + 2,
        );
        let count_sql = format!(
            "SELECT COUNT(*) {from} {where_clause}",
            from = USER_ACTIVITY_FROM,
            where_clause = conds.where_sql(),
        );

        let rows_query = sqlx::query_as::<_, UserActivityRow>(&rows_sql);
        let users = bind_sql_values!(rows_query, conds.values())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let total_count = bind_sql_values!(count_query, conds.values())
            .fetch_one(&self.pool)
            .await?;

        Ok(UserListResponse {
            users,
            pagination: Pagination::new(page, limit, total_count),
        })
    }

    /// Grouped event counts. `groupBy` comes from an allow-list; an
    /// unknown value is a validation error, not a silent default.
    pub async fn event_counts(&self, query: EventListQuery) -> Result<EventCountsResponse> {
        let group_by = query.group_by.as_deref().unwrap_or("type");
        let label_expr = match group_by {
            "type" => "type",
            "day" => "TO_CHAR(created_at, 'YYYY-MM-DD')",
            "user" => "COALESCE(uid::text, 'anonymous')",
            other => {
                return Err(Error::BadRequest(format!(
                    "Unsupported groupBy value: {}",
                    other
                )))
            }
        };
        let order = if group_by == "day" {
            "ORDER BY label"
        } else {
            "ORDER BY count DESC"
        };

        let mut conds = ConditionSet::new();
        if let Some(start) = query.start_date {
            conds.push("created_at >= $?", SqlValue::Timestamp(start));
        }
        if let Some(end) = query.end_date {
            conds.push("created_at <= $?", SqlValue::Timestamp(end));
        }
        if let Some(ref event_type) = query.event_type {
            conds.push("type = $?", SqlValue::Text(event_type.clone()));
        }

        let sql = format!(
            "SELECT {label} AS label, COUNT(*) AS count
             FROM events
             {where_clause}
             GROUP BY {label}
             {order}",
            label = label_expr,
            where_clause = conds.where_sql(),
            order = order,
        );
        let counts_query = sqlx::query_as::<_, EventCountRow>(&sql);
        let counts = bind_sql_values!(counts_query, conds.values())
            .fetch_all(&self.pool)
            .await?;

        Ok(EventCountsResponse {
            group_by: group_by.to_string(),
            counts,
        })
    }

    /// Filtered, paginated answer listing with summary stats computed
    /// over the same filtered set.
    pub async fn list_answers(&self, query: AnswerListQuery) -> Result<AnswerListResponse> {
        let (page, limit, offset) = page_params(query.page, query.limit);

        let mut conds = ConditionSet::new();
        if let Some(start) = query.start_date {
            conds.push("a.created_at >= $?", SqlValue::Timestamp(start));
        }
        if let Some(end) = query.end_date {
            conds.push("a.created_at <= $?", SqlValue::Timestamp(end));
        }
        if let Some(ref question) = query.question {
            conds.push("a.question ILIKE $?", SqlValue::Text(format!("%{}%", question)));
        }
        if let Some(uid) = query.uid {
            conds.push("a.uid = $?", SqlValue::Uuid(uid));
        }
        if query.include_results == Some(false) {
            conds.push(
                "a.question <> $?",
                SqlValue::Text(QUIZ_RESULT_QUESTION.to_string()),
            );
        }

        let rows_sql = format!(
            "SELECT a.id, a.uid, a.question, a.answer, a.time_taken, a.question_time, a.created_at
             FROM answers a
             {where_clause}
             ORDER BY a.created_at DESC, a.id DESC
             LIMIT ${limit_idx} OFFSET ${offset_idx}",
            where_clause = conds.where_sql(),
            limit_idx = conds.bind_count() + 1,
            offset_idx = conds.bind_count() + 2,
        );
        let stats_sql = format!(
            "SELECT COUNT(*) AS total_answers,
                    COUNT(DISTINCT a.uid) AS unique_users,
                    AVG(a.time_taken) AS avg_time_taken,
                    MIN(a.time_taken) AS min_time_taken,
                    MAX(a.time_taken) AS max_time_taken
             FROM answers a
             {where_clause}",
            where_clause = conds.where_sql(),
        );

        let rows_query = sqlx::query_as::<_, Answer>(&rows_sql);
        let answers = bind_sql_values!(rows_query, conds.values())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let stats_query = sqlx::query_as::<_, AnswerStats>(&stats_sql);
        let stats = bind_sql_values!(stats_query, conds.values())
            .fetch_one(&self.pool)
            .await?;

        let total_count = stats.total_answers;
        Ok(AnswerListResponse {
            answers,
            stats,
            pagination: Pagination::new(page, limit, total_count),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    #[test]
    fn absent_filters_impose_no_constraint() {
        let conds = user_conditions(&UserListQuery::default());
        assert_eq!(conds.where_sql(), "");
    }

    #[test]
    fn filters_combine_conjunctively_in_order() {
        let query = UserListQuery {
            start_date: Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()),
            browser: Some("Firefox".into()),
            completed_quiz: Some(false),
            min_events: Some(3),
            ..Default::default()
        };
        let conds = user_conditions(&query);
        assert_eq!(
            conds.where_sql(),
            "WHERE u.created_at >= $1 AND u.browser ILIKE $2 \
             AND COALESCE(an.answers_count, 0) = 0 \
             AND COALESCE(ev.total_events, 0) >= $3"
        );
        assert_eq!(conds.values()[1], SqlValue::Text("%Firefox%".into()));
        assert_eq!(conds.values()[2], SqlValue::Int(3));
    }

    #[test]
    fn completed_quiz_true_requires_an_answer_row() {
        let query = UserListQuery {
            completed_quiz: Some(true),
            ..Default::default()
        };
        let conds = user_conditions(&query);
        assert_eq!(conds.where_sql(), "WHERE COALESCE(an.answers_count, 0) > 0");
        assert_eq!(conds.bind_count(), 0);
    }

    #[test]
    fn sort_defaults_to_most_recent_first() {
        assert_eq!(
            user_order_clause(None, None),
            "ORDER BY u.created_at DESC NULLS LAST, u.id"
        );
    }

    #[test]
    fn sort_always_ends_with_a_unique_tiebreaker() {
        // Every clause must impose a total order, or tied rows can shift
        // between the per-page queries.
        for (key, _) in USER_SORT_COLUMNS {
            let clause = user_order_clause(Some(key), Some("asc"));
            assert!(clause.ends_with(", u.id"), "no tiebreaker in {clause:?}");
        }
    }

    #[test]
    fn sort_allow_list_rejects_unknown_columns() {
        // Never interpolate a caller-supplied column name.
        assert_eq!(
            user_order_clause(Some("password_hash; DROP TABLE users"), Some("asc")),
            "ORDER BY u.created_at ASC NULLS LAST, u.id"
        );
        assert_eq!(
            user_order_clause(Some("total_events"), Some("asc")),
            "ORDER BY total_events ASC NULLS LAST, u.id"
        );
        assert_eq!(
            user_order_clause(Some("click_count"), Some("bogus")),
            "ORDER BY click_count DESC NULLS LAST, u.id"
        );
    }

    #[test]
    fn pages_are_one_based_with_clamped_limit() {
        assert_eq!(page_params(None, None), (1, DEFAULT_PAGE_SIZE, 0));
        assert_eq!(page_params(Some(3), Some(10)), (3, 10, 20));
        assert_eq!(page_params(Some(0), Some(1000)), (1, MAX_PAGE_SIZE, 0));
    }
}
