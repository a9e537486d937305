use crate::utils::jwt::{self, Claims};
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// Rejects the request unless a valid bearer token is present; on success
/// the decoded [`Claims`] are inserted as a request extension.
pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"missing_authorization"})),
        )
            .into_response();
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"bad_authorization"})),
        )
            .into_response();
    };
    let Some(token) = jwt::bearer_token(auth_str) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"unsupported_scheme"})),
        )
            .into_response();
    };

    let config = crate::config::get_config();
    match jwt::decode_token(&config.jwt_secret, token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"invalid_token"})),
        )
            .into_response(),
    }
}

/// Best-effort identity recovery for endpoints that accept anonymous
/// traffic: a missing, malformed or expired token yields `None` instead
/// of a rejection.
pub fn claims_from_headers(headers: &axum::http::HeaderMap) -> Option<Claims> {
    let auth_str = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = jwt::bearer_token(auth_str)?;
    let config = crate::config::get_config();
    jwt::decode_token(&config.jwt_secret, token).ok()
}
