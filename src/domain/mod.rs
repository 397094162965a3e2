//! Domain module
//!
//! Core domain types and validation rules.

pub mod amount;
pub mod card;
pub mod context;
pub mod error;
pub mod media;
pub mod validation;

pub use amount::{AmountError, PaymentAmount};
pub use card::CardDetails;
pub use context::RequestContext;
pub use error::DomainError;
pub use media::normalize_media_list;
