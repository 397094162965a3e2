//! Login Handler

use sqlx::PgPool;

use crate::auth::{PasswordHasher, TokenService, TokenUser};
use crate::domain::validation::{normalize_email, required};
use crate::domain::RequestContext;
use crate::error::AppError;
use crate::store::accounts::{find_user_by_email, latest_card};

use super::{AccountSession, LoginCommand};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub struct LoginHandler {
    pool: PgPool,
    tokens: TokenService,
    passwords: PasswordHasher,
}

impl LoginHandler {
    pub fn new(pool: PgPool, tokens: TokenService, passwords: PasswordHasher) -> Self {
        Self {
            pool,
            tokens,
            passwords,
        }
    }

    pub async fn execute(
        &self,
        command: LoginCommand,
        context: &RequestContext,
    ) -> Result<AccountSession, AppError> {
        let email = normalize_email(&command.email)?;
        required("password", &command.password)?;

        let Some(mut user) = find_user_by_email(&self.pool, &email).await? else {
            tracing::warn!(correlation_id = ?context.correlation_id, "Login failed: unknown email");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !user.is_active() {
            tracing::warn!(user_id = user.id, "Login failed: inactive account");
            return Err(AppError::Forbidden(
                "Account is inactive. Contact the administrator".to_string(),
            ));
        }

        if !self
            .passwords
            .verify(&command.password, &user.password_hash)
            .await?
        {
            tracing::warn!(user_id = user.id, "Login failed: wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        // Last-login stamp; a failure here does not block the login
        match sqlx::query_scalar("UPDATE users SET updated_at = NOW() WHERE id = $1 RETURNING updated_at")
            .bind(user.id)
            .fetch_one(&self.pool)
            .await
        {
            Ok(updated_at) => user.updated_at = updated_at,
            Err(e) => tracing::warn!(user_id = user.id, error = %e, "Could not record last login"),
        }

        let card = latest_card(&self.pool, user.id).await?;

        let token = self
            .tokens
            .issue(TokenUser::from(&user))
            .map_err(|e| AppError::Internal(e.to_string()))?;

        tracing::info!(
            user_id = user.id,
            correlation_id = ?context.correlation_id,
            "User logged in"
        );

        Ok(AccountSession { user, token, card })
    }
}
