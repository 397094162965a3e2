//! Postgres implementation of the registration store.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::{EventSummary, NewSale, RegistrationStore, Sale, SaleOutcome, StoreError};

#[derive(Debug, Clone)]
pub struct PgRegistrationStore {
    pool: PgPool,
}

impl PgRegistrationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Both writes of the sale step. Caller owns commit/rollback.
    async fn apply_sale(
        tx: &mut Transaction<'_, Postgres>,
        sale: &NewSale,
    ) -> Result<SaleOutcome, StoreError> {
        let inserted: Option<Sale> = sqlx::query_as(
            r#"
            INSERT INTO sales (event_id, user_id, card_id, amount, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (event_id, user_id) DO NOTHING
            RETURNING id, event_id, user_id, card_id, amount, created_at
            "#,
        )
        .bind(sale.event_id)
        .bind(sale.user_id)
        .bind(sale.card_id)
        .bind(sale.amount)
        .fetch_optional(&mut **tx)
        .await?;

        let Some(recorded) = inserted else {
            return Ok(SaleOutcome::AlreadyRegistered);
        };

        // Row lock plus the capacity guard: concurrent callers re-check
        // after the lock is released and see the decremented value.
        let event: Option<EventSummary> = sqlx::query_as(
            r#"
            UPDATE events
            SET capacity = capacity - 1
            WHERE id = $1 AND capacity > 0
            RETURNING id, title, event_date, capacity
            "#,
        )
        .bind(sale.event_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(match event {
            Some(event) => SaleOutcome::Recorded {
                sale: recorded,
                event,
            },
            None => SaleOutcome::CapacityExhausted,
        })
    }
}

#[async_trait]
impl RegistrationStore for PgRegistrationStore {
    async fn find_event(&self, event_id: i64) -> Result<Option<EventSummary>, StoreError> {
        let event = sqlx::query_as(
            "SELECT id, title, event_date, capacity FROM events WHERE id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    async fn user_exists(&self, user_id: i64) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn card_belongs_to(&self, card_id: i64, user_id: i64) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM cards WHERE id = $1 AND user_id = $2)",
        )
        .bind(card_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn sale_exists(&self, event_id: i64, user_id: i64) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM sales WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn record_sale(&self, sale: NewSale) -> Result<SaleOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        match Self::apply_sale(&mut tx, &sale).await {
            Ok(outcome @ SaleOutcome::Recorded { .. }) => {
                tx.commit().await?;
                Ok(outcome)
            }
            Ok(outcome) => {
                tx.rollback().await?;
                Ok(outcome)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(
                        event_id = sale.event_id,
                        user_id = sale.user_id,
                        error = %rollback_err,
                        "Rollback of sale transaction failed"
                    );
                }
                Err(err)
            }
        }
    }
}
