use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

async fn setup() -> Option<(Router, PgPool)> {
    dotenvy::dotenv().ok();
    if env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set, skipping integration test");
        return None;
    }
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    let _ = quiz_tracker_backend::config::init_config();

    let pool = quiz_tracker_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    let state = quiz_tracker_backend::AppState::new(pool.clone());
    Some((quiz_tracker_backend::routes::router(state), pool))
}

async fn json_body(resp: axum::response::Response) -> JsonValue {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn events_and_answers_aggregate_per_user() {
    let Some((app, _pool)) = setup().await else {
        return;
    };

    let uid = Uuid::new_v4();
    let browser_marker = format!("TrackerTest-{}", uid.simple());

    let resp = app
        .clone()
        .oneshot(post_json(
            "/user",
            json!({
                "uid": uid,
                "browser": browser_marker,
                "os": "Linux x86_64",
                "screen": {"width": 1920, "height": 1080},
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // 3 clicks and 2 hovers.
    for i in 0..3 {
        let resp = app
            .clone()
            .oneshot(post_json(
                "/event",
                json!({
                    "uid": uid,
                    "type": "click",
                    "metadata": {"x": 10 * i, "y": 20, "target": "startQuizBtn"},
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
    for answer_text in ["Iron Man", "Thor"] {
        let resp = app
            .clone()
            .oneshot(post_json(
                "/event",
                json!({
                    "uid": uid,
                    "type": "hover",
                    "metadata": {"answerText": answer_text, "duration": 1200.5},
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .clone()
        .oneshot(post_json(
            "/answer",
            json!({
                "uid": uid,
                "question": "Pick a weekend plan",
                "answer": "Tinker in the workshop",
                "time": 12.5,
                "questionTime": 4.2,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["status"], "saved");

    // The user listing must aggregate exactly what was recorded.
    let req = Request::builder()
        .method("GET")
        .uri(format!("/admin/users?browser={}", browser_marker))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    let row = &users[0];
    assert_eq!(row["id"].as_str().unwrap(), uid.to_string());
    assert_eq!(row["total_events"], 5);
    assert_eq!(row["click_count"], 3);
    assert_eq!(row["hover_count"], 2);
    assert_eq!(row["answers_count"], 1);
}

#[tokio::test]
async fn event_without_uid_is_attributed_from_bearer_token() {
    let Some((app, pool)) = setup().await else {
        return;
    };

    let suffix = Uuid::new_v4().simple().to_string();
    let resp = app
        .clone()
        .oneshot(post_json(
            "/register",
            json!({
                "username": format!("tracked_{}", suffix),
                "email": format!("tracked_{}@example.com", suffix),
                "password": "pw-longenough",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let token = body["token"].as_str().unwrap().to_string();
    let user_id: Uuid = body["user"]["id"].as_str().unwrap().parse().unwrap();

    let mut req = post_json(
        "/event",
        json!({"type": "click", "metadata": {"x": 1, "y": 2, "target": "logoutBtn"}}),
    );
    req.headers_mut().insert(
        "authorization",
        format!("Bearer {}", token).parse().unwrap(),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let stored_uid: Option<Uuid> =
        sqlx::query_scalar("SELECT uid FROM events WHERE uid = $1 ORDER BY id DESC LIMIT 1")
            .bind(user_id)
            .fetch_optional(&pool)
            .await
            .expect("query")
            .flatten();
    assert_eq!(stored_uid, Some(user_id));

    // An invalid token degrades to anonymous instead of rejecting.
    let mut req = post_json("/event", json!({"type": "click", "metadata": {}}));
    req.headers_mut()
        .insert("authorization", "Bearer bogus.token.value".parse().unwrap());
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
