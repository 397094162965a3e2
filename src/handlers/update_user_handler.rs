//! Profile Handlers
//!
//! Profile updates and password changes for the authenticated user.

use sqlx::PgPool;

use crate::auth::PasswordHasher;
use crate::domain::validation::{normalize_person_name, required, validate_password};
use crate::domain::{DomainError, RequestContext};
use crate::error::AppError;
use crate::store::UserRow;

use super::{ChangePasswordCommand, UpdateProfileCommand};

// =========================================================================
// UpdateProfileHandler
// =========================================================================

pub struct UpdateProfileHandler {
    pool: PgPool,
}

impl UpdateProfileHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn execute(
        &self,
        user_id: i64,
        command: UpdateProfileCommand,
        context: &RequestContext,
    ) -> Result<UserRow, AppError> {
        let first_name = normalize_optional("first_name", command.first_name)?;
        let last_name = normalize_optional("last_name", command.last_name)?;

        let mut tx = self.pool.begin().await?;

        let user: Option<UserRow> = sqlx::query_as(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, first_name, last_name, status, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(first_name)
        .bind(last_name)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user) = user else {
            tx.rollback().await?;
            return Err(DomainError::UserNotFound(user_id).into());
        };

        tx.commit().await?;

        tracing::info!(user_id, correlation_id = ?context.correlation_id, "Profile updated");
        Ok(user)
    }
}

/// Blank or missing values mean "keep the current one"
fn normalize_optional(field: &str, value: Option<String>) -> Result<Option<String>, DomainError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| normalize_person_name(field, &v))
        .transpose()
}

// =========================================================================
// ChangePasswordHandler
// =========================================================================

pub struct ChangePasswordHandler {
    pool: PgPool,
    passwords: PasswordHasher,
}

impl ChangePasswordHandler {
    pub fn new(pool: PgPool, passwords: PasswordHasher) -> Self {
        Self { pool, passwords }
    }

    pub async fn execute(
        &self,
        user: &UserRow,
        command: ChangePasswordCommand,
        context: &RequestContext,
    ) -> Result<(), AppError> {
        required("current_password", &command.current_password)?;
        required("new_password", &command.new_password)?;

        if !self
            .passwords
            .verify(&command.current_password, &user.password_hash)
            .await?
        {
            return Err(DomainError::invalid("The current password is incorrect").into());
        }

        validate_password("new_password", &command.new_password)?;

        if self
            .passwords
            .verify(&command.new_password, &user.password_hash)
            .await?
        {
            return Err(DomainError::invalid(
                "The new password must be different from the current one",
            )
            .into());
        }

        let password_hash = self.passwords.hash(&command.new_password).await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(user.id)
            .bind(&password_hash)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(
            user_id = user.id,
            correlation_id = ?context.correlation_id,
            "Password changed"
        );
        Ok(())
    }
}
