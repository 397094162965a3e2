//! Speaker Handler
//!
//! Links an existing speaker to an existing event.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::validation::positive_id;
use crate::domain::{DomainError, RequestContext};
use crate::error::AppError;

use super::{AssignSpeakerCommand, SpeakerAssignment};

pub struct AssignSpeakerHandler {
    pool: PgPool,
}

impl AssignSpeakerHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn execute(
        &self,
        command: AssignSpeakerCommand,
        context: &RequestContext,
    ) -> Result<SpeakerAssignment, AppError> {
        let event_id = positive_id("event id", command.event_id)?;
        let speaker_id = positive_id("speaker id", command.speaker_id)?;

        let mut tx = self.pool.begin().await?;

        let event_title: Option<String> = sqlx::query_scalar("SELECT title FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(event_title) = event_title else {
            tx.rollback().await?;
            return Err(DomainError::EventNotFound(event_id).into());
        };

        let speaker_name: Option<String> = sqlx::query_scalar("SELECT name FROM speakers WHERE id = $1")
            .bind(speaker_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(speaker_name) = speaker_name else {
            tx.rollback().await?;
            return Err(DomainError::SpeakerNotFound(speaker_id).into());
        };

        let inserted: Option<(i64, DateTime<Utc>)> = sqlx::query_as(
            r#"
            INSERT INTO event_speakers (event_id, speaker_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (event_id, speaker_id) DO NOTHING
            RETURNING id, created_at
            "#,
        )
        .bind(event_id)
        .bind(speaker_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((id, assigned_at)) = inserted else {
            tx.rollback().await?;
            return Err(DomainError::SpeakerAlreadyAssigned {
                event_id,
                speaker_id,
            }
            .into());
        };

        tx.commit().await?;

        tracing::info!(
            assignment_id = id,
            event_id,
            speaker_id,
            correlation_id = ?context.correlation_id,
            "Speaker assigned to event"
        );

        Ok(SpeakerAssignment {
            id,
            event_title,
            speaker_name,
            assigned_at,
        })
    }
}
