//! Registration stress tool
//!
//! Creates one event with a small capacity and fires concurrent
//! registrations at it, then checks that no seat was oversold.
//!
//! Run with: cargo run --bin registration_stress --release -- --buyers 200 --capacity 25

use std::sync::Arc;
use std::time::Instant;

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use event_registration::handlers::{RegisterForEventCommand, RegisterForEventHandler};
use event_registration::store::PgRegistrationStore;
use event_registration::{AppError, DomainError, RequestContext};

fn arg_or(args: &[String], flag: &str, default: i64) -> i64 {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

async fn create_event(pool: &PgPool, capacity: i64) -> anyhow::Result<i64> {
    let id = sqlx::query_scalar(
        r#"
        INSERT INTO events (title, event_date, location, capacity, price, status_id)
        VALUES ($1, CURRENT_DATE + 30, 'Stress hall', $2, 50.00, 1)
        RETURNING id
        "#,
    )
    .bind(format!("Stress run {}", uuid::Uuid::new_v4()))
    .bind(capacity as i32)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Insert a buyer with one card; returns (user_id, card_id)
async fn create_buyer(pool: &PgPool, run: &str, n: i64) -> anyhow::Result<(i64, i64)> {
    let user_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO users (email, password_hash, first_name, last_name)
        VALUES ($1, 'not-a-login-account', 'Stress', 'Buyer')
        RETURNING id
        "#,
    )
    .bind(format!("stress-{run}-{n}@example.com"))
    .fetch_one(pool)
    .await?;

    let card_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO cards (user_id, card_number, expiry, cvc, holder_name)
        VALUES ($1, '4111111111111111', '12/30', '123', 'STRESS BUYER')
        RETURNING id
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok((user_id, card_id))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let buyers = arg_or(&args, "--buyers", 100).max(1);
    let capacity = arg_or(&args, "--capacity", 10).max(0);

    let database_url = std::env::var("DATABASE_URL")?;

    println!("Registration stress - {buyers} buyers, capacity {capacity}");
    println!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let run = uuid::Uuid::new_v4().simple().to_string();
    let event_id = create_event(&pool, capacity).await?;

    let mut participants = Vec::with_capacity(buyers as usize);
    for n in 0..buyers {
        participants.push(create_buyer(&pool, &run, n).await?);
    }

    let handler = Arc::new(RegisterForEventHandler::new(PgRegistrationStore::new(
        pool.clone(),
    )));

    let start = Instant::now();
    let mut tasks = Vec::with_capacity(participants.len());
    for (user_id, card_id) in participants {
        let handler = Arc::clone(&handler);
        tasks.push(tokio::spawn(async move {
            let context = RequestContext::new().with_request_user(user_id);
            let command =
                RegisterForEventCommand::new(event_id, user_id, card_id, Decimal::new(5000, 2));
            handler.execute(command, &context).await
        }));
    }

    let (mut sold, mut sold_out, mut failed) = (0i64, 0i64, 0i64);
    for task in tasks {
        match task.await? {
            Ok(_) => sold += 1,
            Err(AppError::Domain(DomainError::CapacityExhausted { .. })) => sold_out += 1,
            Err(e) => {
                failed += 1;
                eprintln!("Unexpected failure: {e}");
            }
        }
    }
    let elapsed = start.elapsed();

    let remaining: i32 = sqlx::query_scalar("SELECT capacity FROM events WHERE id = $1")
        .bind(event_id)
        .fetch_one(&pool)
        .await?;
    let recorded: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE event_id = $1")
        .bind(event_id)
        .fetch_one(&pool)
        .await?;

    println!("\n=== Registration Stress Results ===");
    println!("Event: {event_id}");
    println!("Sold: {sold}");
    println!("Sold out: {sold_out}");
    println!("Other failures: {failed}");
    println!("Sales recorded: {recorded}");
    println!("Remaining capacity: {remaining}");
    println!("Time: {:.2}s", elapsed.as_secs_f64());

    if recorded != capacity.min(buyers) || i64::from(remaining) != capacity - recorded {
        anyhow::bail!("capacity accounting mismatch");
    }

    Ok(())
}
