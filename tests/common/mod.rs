//! Common test utilities

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::util::ServiceExt;

use event_registration::auth::{PasswordHasher, TokenService};
use event_registration::{build_router, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_PASSWORD: &str = "Secret123";

/// Connect and migrate, or `None` when no database is configured
pub async fn setup_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

pub fn token_service() -> TokenService {
    TokenService::new(TEST_SECRET, "event-registration-api", "event-registration-app", 3600)
}

pub fn app(pool: PgPool) -> Router {
    build_router(AppState::new(pool, token_service(), PasswordHasher::new(4)))
}

/// Unique per call so tests can share a database without truncating it
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// Send a request and decode the envelope
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Register through the API; returns (user_id, token)
pub async fn register_user(app: &Router, email: &str) -> (i64, String) {
    let (status, json) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(serde_json::json!({
            "email": email,
            "password": TEST_PASSWORD,
            "first_name": "Ana",
            "last_name": "Lopez",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {json}");

    let user_id = json["data"]["user"]["id"].as_i64().unwrap();
    let token = json["data"]["token"].as_str().unwrap().to_string();
    (user_id, token)
}

/// Insert an active event dated `days_ahead` from today
pub async fn seed_event(pool: &PgPool, title: &str, capacity: i32, days_ahead: i32) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO events (title, event_date, country, location, description, capacity,
                            price, images, videos, event_type, status_id)
        VALUES ($1, CURRENT_DATE + $2::int, 'Peru', 'Lima', 'Integration event', $3,
                120.00, '["a.jpg","b.jpg"]', NULL, 'Conferencia', 1)
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(days_ahead)
    .bind(capacity)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn seed_speaker(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO speakers (title, name, position, company, profile_image)
        VALUES ('Dr.', $1, 'CTO', 'Acme', 'speaker.jpg')
        RETURNING id
        "#,
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Insert a user and card directly; returns (user_id, card_id)
pub async fn seed_buyer(pool: &PgPool) -> (i64, i64) {
    let user_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO users (email, password_hash, first_name, last_name)
        VALUES ($1, 'unused', 'Buyer', 'Test')
        RETURNING id
        "#,
    )
    .bind(unique_email("buyer"))
    .fetch_one(pool)
    .await
    .unwrap();

    let card_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO cards (user_id, card_number, expiry, cvc, holder_name)
        VALUES ($1, '4111111111111111', '12/30', '123', 'BUYER TEST')
        RETURNING id
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap();

    (user_id, card_id)
}

pub async fn event_capacity(pool: &PgPool, event_id: i64) -> i32 {
    sqlx::query_scalar("SELECT capacity FROM events WHERE id = $1")
        .bind(event_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn sales_for_event(pool: &PgPool, event_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE event_id = $1")
        .bind(event_id)
        .fetch_one(pool)
        .await
        .unwrap()
}
