//! Registration store
//!
//! The persistence seam used by the registration engine. Production code
//! talks to Postgres through [`PgRegistrationStore`]; tests plug in an
//! in-memory implementation.

pub mod accounts;
mod postgres;
mod rows;

use async_trait::async_trait;
use rust_decimal::Decimal;

pub use postgres::PgRegistrationStore;
pub use rows::{CardRow, EventSummary, Sale, UserRow, USER_STATUS_ACTIVE};

/// Store-level failures. Always surfaced to clients as internal errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Backend(String),
}

/// Sale to be written by [`RegistrationStore::record_sale`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub event_id: i64,
    pub user_id: i64,
    pub card_id: i64,
    pub amount: Decimal,
}

/// Result of the atomic sale step
#[derive(Debug, Clone, PartialEq)]
pub enum SaleOutcome {
    /// Sale inserted and capacity decremented, transaction committed
    Recorded { sale: Sale, event: EventSummary },
    /// Another registration took the last seat; nothing was written
    CapacityExhausted,
    /// The unique (event, user) pair already exists; nothing was written
    AlreadyRegistered,
}

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn find_event(&self, event_id: i64) -> Result<Option<EventSummary>, StoreError>;

    async fn user_exists(&self, user_id: i64) -> Result<bool, StoreError>;

    /// True when the card exists and is owned by `user_id`
    async fn card_belongs_to(&self, card_id: i64, user_id: i64) -> Result<bool, StoreError>;

    async fn sale_exists(&self, event_id: i64, user_id: i64) -> Result<bool, StoreError>;

    /// Insert the sale and take one seat in a single transaction.
    ///
    /// Either both writes are committed or neither is.
    async fn record_sale(&self, sale: NewSale) -> Result<SaleOutcome, StoreError>;
}
