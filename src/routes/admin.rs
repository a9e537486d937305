use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};

use crate::{
    dto::admin_dto::{AnswerListQuery, EventListQuery, UserListQuery},
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/admin/users",
    params(
        ("startDate" = Option<String>, Query, description = "Created-at lower bound (RFC 3339)"),
        ("endDate" = Option<String>, Query, description = "Created-at upper bound (RFC 3339)"),
        ("browser" = Option<String>, Query, description = "Browser substring filter"),
        ("os" = Option<String>, Query, description = "OS substring filter"),
        ("completedQuiz" = Option<bool>, Query, description = "Quiz completion filter"),
        ("minEvents" = Option<i64>, Query, description = "Minimum total event count"),
        ("maxEvents" = Option<i64>, Query, description = "Maximum total event count"),
        ("sortBy" = Option<String>, Query, description = "Sort column (allow-listed)"),
        ("sortOrder" = Option<String>, Query, description = "asc or desc"),
        ("page" = Option<i64>, Query, description = "1-based page number"),
        ("limit" = Option<i64>, Query, description = "Page size")
    ),
    responses((status = 200, description = "Paginated per-user activity aggregates"))
)]
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.report_service.list_users(query).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/admin/analytics",
    responses((status = 200, description = "Behavioral analytics aggregates"))
)]
#[axum::debug_handler]
pub async fn analytics(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let result = state.analytics_service.analytics().await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/admin/events",
    params(
        ("startDate" = Option<String>, Query, description = "Created-at lower bound (RFC 3339)"),
        ("endDate" = Option<String>, Query, description = "Created-at upper bound (RFC 3339)"),
        ("type" = Option<String>, Query, description = "Event type filter"),
        ("groupBy" = Option<String>, Query, description = "type, day or user")
    ),
    responses(
        (status = 200, description = "Grouped event counts"),
        (status = 400, description = "Unsupported groupBy value")
    )
)]
#[axum::debug_handler]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.report_service.event_counts(query).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/admin/answers",
    params(
        ("startDate" = Option<String>, Query, description = "Created-at lower bound (RFC 3339)"),
        ("endDate" = Option<String>, Query, description = "Created-at upper bound (RFC 3339)"),
        ("question" = Option<String>, Query, description = "Question substring filter"),
        ("uid" = Option<String>, Query, description = "Filter by user id"),
        ("includeResults" = Option<bool>, Query, description = "Include sentinel outcome rows (default true)"),
        ("page" = Option<i64>, Query, description = "1-based page number"),
        ("limit" = Option<i64>, Query, description = "Page size")
    ),
    responses((status = 200, description = "Paginated answers with summary stats"))
)]
#[axum::debug_handler]
pub async fn list_answers(
    State(state): State<AppState>,
    Query(query): Query<AnswerListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.report_service.list_answers(query).await?;
    Ok(Json(result))
}
