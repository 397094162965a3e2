//! Catalog Service
//!
//! Read side for events and purchases. Related rows are loaded in bulk and
//! stitched together in memory by [`assemble_events`].

use std::collections::HashMap;

use chrono::Utc;
use sqlx::PgPool;

use crate::domain::card::last_four;
use crate::domain::normalize_media_list;
use crate::domain::validation::positive_id;
use crate::domain::DomainError;
use crate::error::AppError;
use crate::store::accounts::find_user;

use super::models::*;

pub const ACTIVE_EVENT_STATUS: i64 = 1;

const EVENT_SELECT: &str = r#"
    SELECT e.id, e.title, e.event_date, e.country, e.location, e.description,
           e.capacity, e.price, e.images, e.videos, e.event_type, e.status_id,
           s.name AS status_name, e.created_at
    FROM events e
    LEFT JOIN event_statuses s ON s.id = e.status_id
"#;

/// Catalog read service
#[derive(Debug, Clone)]
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Full detail of one event, partners included
    pub async fn event_detail(&self, event_id: i64) -> Result<EventView, AppError> {
        let event_id = positive_id("event id", event_id)?;

        let event: EventRow = sqlx::query_as(&format!("{EVENT_SELECT} WHERE e.id = $1"))
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DomainError::EventNotFound(event_id))?;

        let ids = [event_id];
        let speakers = self.speakers_for(&ids).await?;
        let days = self.days_for(&ids).await?;
        let slots = self.slots_for(&days).await?;
        let partners = self.partners().await?;

        let mut views = assemble_events(vec![event], speakers, days, slots);
        let mut view = views
            .pop()
            .ok_or_else(|| AppError::Internal("assembled event missing".to_string()))?;
        view.total_aliados = Some(partners.len());
        view.partners = Some(partners.into_iter().map(partner_view).collect());
        Ok(view)
    }

    /// Active events, newest date first
    pub async fn list_active_events(&self) -> Result<EventListing, AppError> {
        let events: Vec<EventRow> = sqlx::query_as(&format!(
            "{EVENT_SELECT} WHERE e.status_id = $1 ORDER BY e.event_date DESC, e.id DESC"
        ))
        .bind(ACTIVE_EVENT_STATUS)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        let speakers = self.speakers_for(&ids).await?;
        let days = self.days_for(&ids).await?;
        let slots = self.slots_for(&days).await?;

        let events = assemble_events(events, speakers, days, slots);
        tracing::debug!(count = events.len(), "Listed active events");

        Ok(EventListing {
            total: events.len(),
            events,
            queried_at: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }

    async fn speakers_for(&self, event_ids: &[i64]) -> Result<Vec<EventSpeakerRow>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT es.event_id, sp.id, sp.title, sp.name, sp.position, sp.company,
                   sp.profile_image, sp.created_at, es.created_at AS assigned_at
            FROM event_speakers es
            JOIN speakers sp ON sp.id = es.speaker_id
            WHERE es.event_id = ANY($1)
            ORDER BY es.created_at, es.id
            "#,
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await
    }

    async fn days_for(&self, event_ids: &[i64]) -> Result<Vec<ScheduleDayRow>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, event_id, day_label, program_title, created_at
            FROM schedule_days
            WHERE event_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await
    }

    async fn slots_for(&self, days: &[ScheduleDayRow]) -> Result<Vec<ScheduleSlotRow>, sqlx::Error> {
        if days.is_empty() {
            return Ok(Vec::new());
        }
        let day_ids: Vec<i64> = days.iter().map(|d| d.id).collect();

        sqlx::query_as(
            r#"
            SELECT sl.id, sl.day_id, sl.slot_time, sl.title, sl.created_at,
                   sp.id AS speaker_id, sp.title AS speaker_title, sp.name AS speaker_name,
                   sp.position AS speaker_position, sp.company AS speaker_company
            FROM schedule_slots sl
            LEFT JOIN speakers sp ON sp.id = sl.speaker_id
            WHERE sl.day_id = ANY($1)
            ORDER BY sl.slot_time, sl.id
            "#,
        )
        .bind(&day_ids)
        .fetch_all(&self.pool)
        .await
    }

    async fn partners(&self) -> Result<Vec<PartnerRow>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, name, image, category_id, created_at FROM partners ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await
    }

    // =========================================================================
    // Purchases
    // =========================================================================

    /// Every purchase of a user, newest first
    pub async fn list_purchases(&self, user_id: i64) -> Result<Vec<PurchaseView>, AppError> {
        let user_id = positive_id("user id", user_id)?;

        if find_user(&self.pool, user_id).await?.is_none() {
            return Err(DomainError::UserNotFound(user_id).into());
        }

        let rows: Vec<PurchaseRow> = sqlx::query_as(
            r#"
            SELECT s.id AS sale_id, s.amount, s.created_at AS sale_created_at,
                   e.id AS event_id, e.title AS event_title, e.event_date,
                   e.country AS event_country, e.location AS event_location,
                   e.price AS event_price, e.images AS event_images,
                   c.id AS card_id, c.card_number, c.expiry AS card_expiry,
                   c.holder_name AS card_holder_name
            FROM sales s
            JOIN events e ON e.id = s.event_id
            JOIN cards c ON c.id = s.card_id
            WHERE s.user_id = $1
            ORDER BY s.created_at DESC, s.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(purchase_view).collect())
    }
}

// =========================================================================
// Assembly
// =========================================================================

/// Nest speakers, schedule days and slots under their events.
///
/// Event order is preserved. Speakers and slots keep the order they were
/// loaded in. Partners are not attached here.
pub fn assemble_events(
    events: Vec<EventRow>,
    speakers: Vec<EventSpeakerRow>,
    days: Vec<ScheduleDayRow>,
    slots: Vec<ScheduleSlotRow>,
) -> Vec<EventView> {
    let mut speakers_by_event: HashMap<i64, Vec<SpeakerView>> = HashMap::new();
    for row in speakers {
        speakers_by_event
            .entry(row.event_id)
            .or_default()
            .push(speaker_view(row));
    }

    let mut slots_by_day: HashMap<i64, Vec<ScheduleSlotView>> = HashMap::new();
    for row in slots {
        slots_by_day.entry(row.day_id).or_default().push(slot_view(row));
    }

    let mut days_by_event: HashMap<i64, Vec<ScheduleDayView>> = HashMap::new();
    for row in days {
        let slots = slots_by_day.remove(&row.id).unwrap_or_default();
        days_by_event
            .entry(row.event_id)
            .or_default()
            .push(ScheduleDayView {
                id: row.id,
                day: row.day_label,
                program_title: row.program_title,
                slots,
                created_at: row.created_at,
            });
    }

    events
        .into_iter()
        .map(|event| {
            let speakers = speakers_by_event.remove(&event.id).unwrap_or_default();
            let schedule = days_by_event.remove(&event.id).unwrap_or_default();
            EventView {
                id: event.id,
                images: normalize_media_list(event.images.as_deref()),
                videos: normalize_media_list(event.videos.as_deref()),
                status: event.status_name.map(|name| StatusView {
                    id: event.status_id,
                    name,
                }),
                title: event.title,
                date: event.event_date,
                country: event.country,
                location: event.location,
                description: event.description,
                capacity: event.capacity,
                price: event.price,
                event_type: event.event_type,
                created_at: event.created_at,
                total_ponentes: speakers.len(),
                total_dias_programacion: schedule.len(),
                speakers,
                schedule,
                partners: None,
                total_aliados: None,
            }
        })
        .collect()
}

fn speaker_view(row: EventSpeakerRow) -> SpeakerView {
    SpeakerView {
        id: row.id,
        title: row.title,
        image: row.profile_image,
        name: row.name,
        position: row.position,
        company: row.company,
        created_at: row.created_at,
        assigned_at: row.assigned_at,
    }
}

fn slot_view(row: ScheduleSlotRow) -> ScheduleSlotView {
    let speaker = match (row.speaker_id, row.speaker_name) {
        (Some(id), Some(name)) => Some(SlotSpeakerView {
            id,
            title: row.speaker_title,
            name,
            position: row.speaker_position,
            company: row.speaker_company,
        }),
        _ => None,
    };

    ScheduleSlotView {
        id: row.id,
        time: row.slot_time,
        title: row.title,
        speaker,
        created_at: row.created_at,
    }
}

fn partner_view(row: PartnerRow) -> PartnerView {
    PartnerView {
        id: row.id,
        name: row.name,
        image: row.image,
        category_id: row.category_id,
        created_at: row.created_at,
    }
}

fn purchase_view(row: PurchaseRow) -> PurchaseView {
    PurchaseView {
        sale: PurchaseSaleView {
            id: row.sale_id,
            amount: row.amount,
            created_at: row.sale_created_at,
        },
        event: PurchaseEventView {
            id: row.event_id,
            titulo_evento: row.event_title,
            fecha_evento: row.event_date,
            pais_evento: row.event_country,
            lugar_evento: row.event_location,
            precio_evento: row.event_price,
            imagenes_evento: normalize_media_list(row.event_images.as_deref()),
        },
        card: PurchaseCardView {
            id: row.card_id,
            ultima_4: last_four(&row.card_number),
            vencimiento: row.card_expiry,
            nombre_tarjeta: row.card_holder_name,
        },
    }
}
