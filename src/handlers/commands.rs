//! Command definitions
//!
//! Commands represent intentions to change the system state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::auth::IssuedToken;
use crate::store::{CardRow, EventSummary, Sale, UserRow};

// =========================================================================
// RegisterForEventCommand
// =========================================================================

/// Command to buy a seat at an event with a stored card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterForEventCommand {
    pub event_id: i64,
    pub user_id: i64,
    pub card_id: i64,
    pub amount: Decimal,
}

impl RegisterForEventCommand {
    pub fn new(event_id: i64, user_id: i64, card_id: i64, amount: Decimal) -> Self {
        Self {
            event_id,
            user_id,
            card_id,
            amount,
        }
    }
}

/// Result of a successful registration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationResult {
    #[serde(rename = "venta")]
    pub sale: Sale,
    #[serde(rename = "evento")]
    pub event: EventSummary,
}

// =========================================================================
// SaveCardCommand
// =========================================================================

/// Command to store a card, or refresh an existing one with the same number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveCardCommand {
    pub user_id: i64,
    pub card_number: String,
    pub expiry: String,
    pub cvc: String,
    pub holder_name: String,
}

impl SaveCardCommand {
    pub fn new(
        user_id: i64,
        card_number: String,
        expiry: String,
        cvc: String,
        holder_name: String,
    ) -> Self {
        Self {
            user_id,
            card_number,
            expiry,
            cvc,
            holder_name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardOutcome {
    Created,
    Updated,
}

impl CardOutcome {
    pub fn message(self) -> &'static str {
        match self {
            CardOutcome::Created => "Card created successfully",
            CardOutcome::Updated => "Card updated successfully",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SaveCardResult {
    pub card: CardRow,
    pub outcome: CardOutcome,
}

// =========================================================================
// Account commands
// =========================================================================

/// Command to sign up a new user
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserCommand {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterUserCommand {
    pub fn new(email: String, password: String, first_name: String, last_name: String) -> Self {
        Self {
            email,
            password,
            first_name,
            last_name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl LoginCommand {
    pub fn new(email: String, password: String) -> Self {
        Self { email, password }
    }
}

/// Profile changes; absent or blank fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileCommand {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UpdateProfileCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_first_name(mut self, first_name: String) -> Self {
        self.first_name = Some(first_name);
        self
    }

    pub fn with_last_name(mut self, last_name: String) -> Self {
        self.last_name = Some(last_name);
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordCommand {
    pub current_password: String,
    pub new_password: String,
}

/// A signed-in user: account row, fresh token and the latest card
#[derive(Debug, Clone)]
pub struct AccountSession {
    pub user: UserRow,
    pub token: IssuedToken,
    pub card: Option<CardRow>,
}

// =========================================================================
// AssignSpeakerCommand
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignSpeakerCommand {
    pub event_id: i64,
    pub speaker_id: i64,
}

/// Result of a new event/speaker assignment
#[derive(Debug, Clone, Serialize)]
pub struct SpeakerAssignment {
    pub id: i64,
    /// Event title
    #[serde(rename = "evento")]
    pub event_title: String,
    /// Speaker name
    #[serde(rename = "ponente")]
    pub speaker_name: String,
    #[serde(rename = "fecha_asignacion")]
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}
