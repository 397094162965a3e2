//! Request extractors
//!
//! Bearer authentication plus JSON/path wrappers whose rejections are
//! reported through [`AppError`] inside the response envelope.

use async_trait::async_trait;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::auth::Claims;
use crate::error::AppError;
use crate::store::accounts::find_active_user;
use crate::store::UserRow;

use super::AppState;

/// JSON body; malformed input becomes `InvalidArgument`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ValidJson<T>(pub T);

/// Path parameters; unparsable values become `InvalidArgument`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ValidPath<T>(pub T);

/// Caller resolved from a verified bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: UserRow,
    pub claims: Claims,
}

impl AuthenticatedUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            AppError::Unauthorized("Missing or malformed bearer token".to_string())
        })?;

        let claims = state.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            AppError::Unauthorized("Invalid or expired token".to_string())
        })?;

        let user_id = claims
            .user_id()
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        // Inactive or deleted users lose access immediately
        let user = find_active_user(&state.pool, user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(Self { user, claims })
    }
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, rest) = value.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    rest.split_whitespace().next()
}
