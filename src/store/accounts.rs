//! User and card lookups shared by the account handlers and the
//! authentication extractor.

use sqlx::PgPool;

use super::{CardRow, UserRow, USER_STATUS_ACTIVE};

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, status, created_at, updated_at";

pub async fn find_user(pool: &PgPool, user_id: i64) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_active_user(
    pool: &PgPool,
    user_id: i64,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND status = $2"
    ))
    .bind(user_id)
    .bind(USER_STATUS_ACTIVE)
    .fetch_optional(pool)
    .await
}

pub async fn find_user_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Most recently added card of a user
pub async fn latest_card(pool: &PgPool, user_id: i64) -> Result<Option<CardRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, user_id, card_number, expiry, cvc, holder_name, created_at
        FROM cards
        WHERE user_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
