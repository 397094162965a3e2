//! Command Handlers module
//!
//! Handlers that validate a command and apply it to the database.
//! Each mutation runs in its own transaction.

mod card_handler;
mod commands;
mod login_handler;
mod registration_handler;
mod speaker_handler;
mod update_user_handler;
mod user_handler;

#[cfg(test)]
mod tests;

pub use card_handler::SaveCardHandler;
pub use commands::*;
pub use login_handler::LoginHandler;
pub use registration_handler::RegisterForEventHandler;
pub use speaker_handler::AssignSpeakerHandler;
pub use update_user_handler::{ChangePasswordHandler, UpdateProfileHandler};
pub use user_handler::RegisterUserHandler;

use crate::domain::RequestContext;
use crate::error::AppError;

/// Reject commands issued on behalf of another user
pub fn ensure_caller(context: &RequestContext, user_id: i64) -> Result<(), AppError> {
    match context.caller() {
        Some(caller) if caller == user_id => Ok(()),
        Some(caller) => {
            tracing::warn!(caller, target_user = user_id, "Caller does not own the target account");
            Err(AppError::Forbidden(
                "You can only operate on your own account".to_string(),
            ))
        }
        None => Err(AppError::Unauthorized("Authentication required".to_string())),
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
