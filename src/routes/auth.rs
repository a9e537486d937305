use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::auth_dto::{AuthResponse, LoginPayload, RegisterPayload, UserResponse},
    error::Result,
    utils::jwt::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/register",
    responses(
        (status = 200, description = "User registered, session token issued"),
        (status = 400, description = "Invalid payload or duplicate username/email")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (token, user) = state
        .auth_service
        .register(payload.username, payload.email, payload.password)
        .await?;
    Ok(Json(AuthResponse {
        message: "User registered successfully".to_string(),
        token,
        user: UserResponse::from(user),
    }))
}

#[utoipa::path(
    post,
    path = "/login",
    responses(
        (status = 200, description = "Login successful, session token issued"),
        (status = 401, description = "Invalid credentials")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (token, user) = state
        .auth_service
        .login(payload.username, payload.password)
        .await?;
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: UserResponse::from(user),
    }))
}

#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Current user"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Token user no longer exists")
    )
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state.auth_service.get_user(claims.user_id()?).await?;
    Ok(Json(serde_json::json!({ "user": UserResponse::from(user) })))
}
