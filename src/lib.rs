//! Event registration library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod store;

pub use api::{build_router, AppState};
pub use config::Config;
pub use domain::{DomainError, PaymentAmount, RequestContext};
pub use error::{AppError, AppResult};
