//! User Handler
//!
//! Signup: validates the fields, hashes the password and creates the user.

use sqlx::PgPool;

use crate::auth::{PasswordHasher, TokenService, TokenUser};
use crate::domain::validation::validate_new_user;
use crate::domain::{DomainError, RequestContext};
use crate::error::AppError;
use crate::store::UserRow;

use super::{is_unique_violation, AccountSession, RegisterUserCommand};

pub struct RegisterUserHandler {
    pool: PgPool,
    tokens: TokenService,
    passwords: PasswordHasher,
}

impl RegisterUserHandler {
    pub fn new(pool: PgPool, tokens: TokenService, passwords: PasswordHasher) -> Self {
        Self {
            pool,
            tokens,
            passwords,
        }
    }

    pub async fn execute(
        &self,
        command: RegisterUserCommand,
        context: &RequestContext,
    ) -> Result<AccountSession, AppError> {
        let new_user = validate_new_user(
            &command.email,
            &command.password,
            &command.first_name,
            &command.last_name,
        )?;

        let taken: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
            .bind(&new_user.email)
            .fetch_one(&self.pool)
            .await?;
        if taken {
            return Err(DomainError::EmailTaken.into());
        }

        let password_hash = self.passwords.hash(&command.password).await?;

        let mut tx = self.pool.begin().await?;

        // The unique index still guards against a concurrent signup
        let user: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 1, NOW(), NOW())
            RETURNING id, email, password_hash, first_name, last_name, status, created_at, updated_at
            "#,
        )
        .bind(&new_user.email)
        .bind(&password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::from(DomainError::EmailTaken)
            } else {
                AppError::from(e)
            }
        })?;

        tx.commit().await?;

        let token = self
            .tokens
            .issue(TokenUser::from(&user))
            .map_err(|e| AppError::Internal(e.to_string()))?;

        tracing::info!(
            user_id = user.id,
            correlation_id = ?context.correlation_id,
            "User registered"
        );

        Ok(AccountSession {
            user,
            token,
            card: None,
        })
    }
}
