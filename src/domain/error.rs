//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Business rule violations raised before anything is written.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Malformed or missing input
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Event {0} not found")]
    EventNotFound(i64),

    #[error("User {0} not found")]
    UserNotFound(i64),

    /// The card does not exist or belongs to someone else
    #[error("Payment card {card_id} not found for user {user_id}")]
    CardNotFound { card_id: i64, user_id: i64 },

    #[error("Speaker {0} not found")]
    SpeakerNotFound(i64),

    /// Event has no remaining capacity
    #[error("No seats left for event {event_id}")]
    CapacityExhausted { event_id: i64 },

    #[error("User {user_id} is already registered for event {event_id}")]
    AlreadyRegistered { event_id: i64, user_id: i64 },

    #[error("Speaker {speaker_id} is already assigned to event {event_id}")]
    SpeakerAlreadyAssigned { event_id: i64, speaker_id: i64 },

    #[error("Email is already registered")]
    EmailTaken,
}

impl DomainError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Check if this error refers to a missing entity
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::EventNotFound(_)
                | Self::UserNotFound(_)
                | Self::CardNotFound { .. }
                | Self::SpeakerNotFound(_)
        )
    }

    /// Check if this error is a uniqueness conflict
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::AlreadyRegistered { .. } | Self::SpeakerAlreadyAssigned { .. } | Self::EmailTaken
        )
    }
}
