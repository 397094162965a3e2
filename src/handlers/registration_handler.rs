//! Registration Handler
//!
//! Buys one seat at an event: validates the caller, event, user and card,
//! then records the sale and decrements capacity atomically.

use crate::domain::validation::positive_id;
use crate::domain::{DomainError, PaymentAmount, RequestContext};
use crate::error::AppError;
use crate::store::{NewSale, RegistrationStore, SaleOutcome};

use super::{ensure_caller, RegisterForEventCommand, RegistrationResult};

// =========================================================================
// RegisterForEventHandler
// =========================================================================

pub struct RegisterForEventHandler<S> {
    store: S,
}

impl<S: RegistrationStore> RegisterForEventHandler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Execute the registration command.
    ///
    /// Every precondition is checked before anything is written; the first
    /// failing check is reported.
    pub async fn execute(
        &self,
        command: RegisterForEventCommand,
        context: &RequestContext,
    ) -> Result<RegistrationResult, AppError> {
        let event_id = positive_id("event id", command.event_id)?;
        let user_id = positive_id("user id", command.user_id)?;
        let card_id = positive_id("card id", command.card_id)?;
        let amount = PaymentAmount::new(command.amount)
            .map_err(|e| DomainError::invalid(format!("Invalid amount: {e}")))?;

        ensure_caller(context, user_id)?;

        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or(DomainError::EventNotFound(event_id))?;

        if event.capacity <= 0 {
            return Err(DomainError::CapacityExhausted { event_id }.into());
        }

        if !self.store.user_exists(user_id).await? {
            return Err(DomainError::UserNotFound(user_id).into());
        }

        if !self.store.card_belongs_to(card_id, user_id).await? {
            return Err(DomainError::CardNotFound { card_id, user_id }.into());
        }

        if self.store.sale_exists(event_id, user_id).await? {
            return Err(DomainError::AlreadyRegistered { event_id, user_id }.into());
        }

        let outcome = self
            .store
            .record_sale(NewSale {
                event_id,
                user_id,
                card_id,
                amount: amount.value(),
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    event_id,
                    user_id,
                    correlation_id = ?context.correlation_id,
                    error = %e,
                    "Sale transaction rolled back"
                );
                AppError::Store(e)
            })?;

        match outcome {
            SaleOutcome::Recorded { sale, event } => {
                tracing::info!(
                    sale_id = sale.id,
                    event_id,
                    user_id,
                    amount = %amount,
                    remaining = event.capacity,
                    correlation_id = ?context.correlation_id,
                    "Event registration recorded"
                );
                Ok(RegistrationResult { sale, event })
            }
            SaleOutcome::CapacityExhausted => {
                tracing::info!(event_id, user_id, "Last seat taken by a concurrent registration");
                Err(DomainError::CapacityExhausted { event_id }.into())
            }
            SaleOutcome::AlreadyRegistered => {
                Err(DomainError::AlreadyRegistered { event_id, user_id }.into())
            }
        }
    }
}
