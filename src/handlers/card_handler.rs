//! Card Handler
//!
//! Stores a payment card. Submitting a number the user already has
//! refreshes that card in place.

use sqlx::{FromRow, PgPool};

use crate::domain::{CardDetails, DomainError, RequestContext};
use crate::error::AppError;
use crate::store::CardRow;

use super::{ensure_caller, CardOutcome, SaveCardCommand, SaveCardResult};

#[derive(Debug, FromRow)]
struct UpsertedCard {
    #[sqlx(flatten)]
    card: CardRow,
    created: bool,
}

pub struct SaveCardHandler {
    pool: PgPool,
}

impl SaveCardHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn execute(
        &self,
        command: SaveCardCommand,
        context: &RequestContext,
    ) -> Result<SaveCardResult, AppError> {
        let details = CardDetails::parse(
            command.user_id,
            &command.card_number,
            &command.expiry,
            &command.cvc,
            &command.holder_name,
        )?;

        ensure_caller(context, details.user_id)?;

        let mut tx = self.pool.begin().await?;

        let user_exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(details.user_id)
            .fetch_one(&mut *tx)
            .await?;
        if !user_exists {
            tx.rollback().await?;
            return Err(DomainError::UserNotFound(details.user_id).into());
        }

        // xmax is zero only for freshly inserted tuples
        let upserted: UpsertedCard = sqlx::query_as(
            r#"
            INSERT INTO cards (user_id, card_number, expiry, cvc, holder_name, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (user_id, card_number) DO UPDATE
            SET expiry = EXCLUDED.expiry,
                cvc = EXCLUDED.cvc,
                holder_name = EXCLUDED.holder_name
            RETURNING id, user_id, card_number, expiry, cvc, holder_name, created_at,
                      (xmax = 0) AS created
            "#,
        )
        .bind(details.user_id)
        .bind(&details.card_number)
        .bind(&details.expiry)
        .bind(&details.cvc)
        .bind(&details.holder_name)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let outcome = if upserted.created {
            CardOutcome::Created
        } else {
            CardOutcome::Updated
        };

        tracing::info!(
            card_id = upserted.card.id,
            user_id = details.user_id,
            outcome = ?outcome,
            correlation_id = ?context.correlation_id,
            "Payment card saved"
        );

        Ok(SaveCardResult {
            card: upserted.card,
            outcome,
        })
    }
}
