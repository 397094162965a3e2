//! Authentication module
//!
//! Token issuing/verification and password hashing.

mod password;
mod token;

pub use password::PasswordHasher;
pub use token::{Claims, IssuedToken, TokenError, TokenService, TokenUser, REFRESH_WINDOW_SECONDS};
