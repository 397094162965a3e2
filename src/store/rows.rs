//! Row types shared by the store and the read models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

pub const USER_STATUS_ACTIVE: i16 = 1;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub status: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn is_active(&self) -> bool {
        self.status == USER_STATUS_ACTIVE
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CardRow {
    pub id: i64,
    pub user_id: i64,
    pub card_number: String,
    pub expiry: String,
    pub cvc: String,
    pub holder_name: String,
    pub created_at: DateTime<Utc>,
}

/// A recorded registration
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Sale {
    pub id: i64,
    #[serde(rename = "id_evento")]
    pub event_id: i64,
    #[serde(rename = "id_user")]
    pub user_id: i64,
    #[serde(rename = "id_tarjeta_pago")]
    pub card_id: i64,
    #[serde(rename = "cantidad_pago")]
    pub amount: Decimal,
    #[serde(rename = "fecha_creacion")]
    pub created_at: DateTime<Utc>,
}

/// Event fields the registration engine needs
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct EventSummary {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "fecha")]
    pub event_date: NaiveDate,
    /// Remaining seats
    #[serde(rename = "cupos_restantes")]
    pub capacity: i32,
}
