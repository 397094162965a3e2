//! Catalog rows and read models
//!
//! Rows mirror the queries in the service; read models are what the API
//! returns, with the field names clients expect.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

// =========================================================================
// Rows
// =========================================================================

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: i64,
    pub title: String,
    pub event_date: NaiveDate,
    pub country: Option<String>,
    pub location: String,
    pub description: Option<String>,
    pub capacity: i32,
    pub price: Option<Decimal>,
    pub images: Option<String>,
    pub videos: Option<String>,
    pub event_type: Option<String>,
    pub status_id: i64,
    pub status_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A speaker joined with its assignment to an event
#[derive(Debug, Clone, FromRow)]
pub struct EventSpeakerRow {
    pub event_id: i64,
    pub id: i64,
    pub title: Option<String>,
    pub name: String,
    pub position: Option<String>,
    pub company: Option<String>,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ScheduleDayRow {
    pub id: i64,
    pub event_id: i64,
    pub day_label: String,
    pub program_title: String,
    pub created_at: DateTime<Utc>,
}

/// A slot with its optional speaker joined in
#[derive(Debug, Clone, FromRow)]
pub struct ScheduleSlotRow {
    pub id: i64,
    pub day_id: i64,
    pub slot_time: NaiveTime,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub speaker_id: Option<i64>,
    pub speaker_title: Option<String>,
    pub speaker_name: Option<String>,
    pub speaker_position: Option<String>,
    pub speaker_company: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PartnerRow {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PurchaseRow {
    pub sale_id: i64,
    pub amount: Decimal,
    pub sale_created_at: DateTime<Utc>,
    pub event_id: i64,
    pub event_title: String,
    pub event_date: NaiveDate,
    pub event_country: Option<String>,
    pub event_location: String,
    pub event_price: Option<Decimal>,
    pub event_images: Option<String>,
    pub card_id: i64,
    pub card_number: String,
    pub card_expiry: String,
    pub card_holder_name: String,
}

// =========================================================================
// Read models
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeakerView {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: Option<String>,
    #[serde(rename = "imagen")]
    pub image: Option<String>,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "cargo")]
    pub position: Option<String>,
    #[serde(rename = "compania")]
    pub company: Option<String>,
    #[serde(rename = "fecha_creacion")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "fecha_asignacion")]
    pub assigned_at: DateTime<Utc>,
}

/// Speaker summary shown inside a schedule slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSpeakerView {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: Option<String>,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "cargo")]
    pub position: Option<String>,
    #[serde(rename = "compania")]
    pub company: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleSlotView {
    pub id: i64,
    #[serde(rename = "hora")]
    pub time: NaiveTime,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "ponente")]
    pub speaker: Option<SlotSpeakerView>,
    #[serde(rename = "fecha_creacion")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleDayView {
    pub id: i64,
    #[serde(rename = "dia")]
    pub day: String,
    #[serde(rename = "titulo_programa")]
    pub program_title: String,
    #[serde(rename = "horarios")]
    pub slots: Vec<ScheduleSlotView>,
    #[serde(rename = "fecha_creacion")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerView {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "imagen")]
    pub image: Option<String>,
    #[serde(rename = "categoria_id")]
    pub category_id: Option<i64>,
    #[serde(rename = "fecha_creacion")]
    pub created_at: DateTime<Utc>,
}

/// Full event read model. `aliados` is only present on the detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventView {
    pub id: i64,
    #[serde(rename = "titulo_evento")]
    pub title: String,
    #[serde(rename = "fecha_evento")]
    pub date: NaiveDate,
    #[serde(rename = "pais_evento")]
    pub country: Option<String>,
    #[serde(rename = "lugar_evento")]
    pub location: String,
    #[serde(rename = "acerca_evento")]
    pub description: Option<String>,
    #[serde(rename = "cupos_evento")]
    pub capacity: i32,
    #[serde(rename = "precio_evento")]
    pub price: Option<Decimal>,
    #[serde(rename = "imagenes_evento")]
    pub images: Vec<String>,
    #[serde(rename = "videos_evento")]
    pub videos: Vec<String>,
    #[serde(rename = "tipo_evento")]
    pub event_type: Option<String>,
    pub status: Option<StatusView>,
    #[serde(rename = "fecha_creacion")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "ponentes")]
    pub speakers: Vec<SpeakerView>,
    #[serde(rename = "programacion")]
    pub schedule: Vec<ScheduleDayView>,
    #[serde(rename = "aliados", skip_serializing_if = "Option::is_none")]
    pub partners: Option<Vec<PartnerView>>,
    pub total_ponentes: usize,
    pub total_dias_programacion: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_aliados: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventListing {
    #[serde(rename = "eventos")]
    pub events: Vec<EventView>,
    pub total: usize,
    /// Query time, `YYYY-MM-DD HH:MM:SS` UTC
    #[serde(rename = "fecha_consulta")]
    pub queried_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseSaleView {
    pub id: i64,
    #[serde(rename = "cantidad_pago")]
    pub amount: Decimal,
    #[serde(rename = "fecha_creacion")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseEventView {
    pub id: i64,
    pub titulo_evento: String,
    pub fecha_evento: NaiveDate,
    pub pais_evento: Option<String>,
    pub lugar_evento: String,
    pub precio_evento: Option<Decimal>,
    pub imagenes_evento: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseCardView {
    pub id: i64,
    pub ultima_4: String,
    pub vencimiento: String,
    pub nombre_tarjeta: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseView {
    #[serde(rename = "venta")]
    pub sale: PurchaseSaleView,
    #[serde(rename = "evento")]
    pub event: PurchaseEventView,
    #[serde(rename = "tarjeta")]
    pub card: PurchaseCardView,
}
