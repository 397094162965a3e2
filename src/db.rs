//! Database module
//!
//! Connectivity and schema checks run at startup.

use sqlx::PgPool;

/// Tables the application reads or writes
pub const REQUIRED_TABLES: &[&str] = &[
    "users",
    "event_statuses",
    "events",
    "speakers",
    "event_speakers",
    "schedule_days",
    "schedule_slots",
    "partner_categories",
    "partners",
    "cards",
    "sales",
];

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    // Registration depends on the "Activo" status row
    let active_status: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM event_statuses WHERE id = 1)")
            .fetch_one(pool)
            .await?;

    if !active_status {
        tracing::error!("Event status seed is missing. Please run migrations.");
        return Ok(false);
    }

    Ok(true)
}
