//! Catalog module
//!
//! Read models for events and purchase history.

pub mod models;
mod service;

pub use models::{EventListing, EventView, PurchaseView};
pub use service::{assemble_events, CatalogService, ACTIVE_EVENT_STATUS};
