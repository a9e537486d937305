use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::tracking_dto::{RecordAnswerPayload, RecordEventPayload, RegisterClientPayload},
    error::Result,
    middleware::auth::claims_from_headers,
    services::tracking_service::resolve_user_id,
    AppState,
};

#[utoipa::path(
    post,
    path = "/user",
    responses((status = 200, description = "Anonymous tracking identity stored"))
)]
#[axum::debug_handler]
pub async fn register_client(
    State(state): State<AppState>,
    Json(payload): Json<RegisterClientPayload>,
) -> Result<impl IntoResponse> {
    state.tracking_service.register_client(payload).await?;
    Ok(Json(json!({ "status": "ok" })))
}

#[utoipa::path(
    post,
    path = "/event",
    responses((status = 200, description = "Event stored"))
)]
#[axum::debug_handler]
pub async fn record_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RecordEventPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    // Identity fallback: body uid, else a valid bearer token, else
    // anonymous. A bad token degrades to anonymous instead of rejecting.
    let token_uid = claims_from_headers(&headers).and_then(|c| c.user_id().ok());
    let uid = resolve_user_id(payload.uid, token_uid);
    state.tracking_service.record_event(uid, payload).await?;
    Ok(Json(json!({ "status": "logged" })))
}

#[utoipa::path(
    post,
    path = "/answer",
    responses((status = 200, description = "Answer stored"))
)]
#[axum::debug_handler]
pub async fn record_answer(
    State(state): State<AppState>,
    Json(payload): Json<RecordAnswerPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state.tracking_service.record_answer(payload).await?;
    Ok(Json(json!({ "status": "saved" })))
}
