pub mod admin;
pub mod auth;
pub mod health;
pub mod tracking;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

/// The full route table, shared between the binary and the integration
/// tests. Bearer auth guards `/me`; the tracking and admin endpoints are
/// open, matching the consumers they serve.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route(
            "/me",
            get(auth::me).layer(axum::middleware::from_fn(
                crate::middleware::auth::require_bearer_auth,
            )),
        )
        .route("/user", post(tracking::register_client))
        .route("/event", post(tracking::record_event))
        .route("/answer", post(tracking::record_answer))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/analytics", get(admin::analytics))
        .route("/admin/events", get(admin::list_events))
        .route("/admin/answers", get(admin::list_answers))
        .with_state(state)
}
