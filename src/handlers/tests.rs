//! Registration engine tests
//!
//! Run the handler against an in-memory store so the precondition order,
//! the atomic step and the concurrency guarantee can be checked without a
//! database.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;

use crate::domain::{DomainError, RequestContext};
use crate::error::{AppError, ErrorKind};
use crate::handlers::{
    ensure_caller, CardOutcome, RegisterForEventCommand, RegisterForEventHandler,
    SaveCardCommand, SaveCardHandler, UpdateProfileCommand,
};
use crate::store::{
    EventSummary, NewSale, RegistrationStore, Sale, SaleOutcome, StoreError,
};

// =========================================================================
// In-memory store
// =========================================================================

#[derive(Default)]
struct MemoryState {
    events: HashMap<i64, EventSummary>,
    users: HashSet<i64>,
    /// card id -> owner
    cards: HashMap<i64, i64>,
    sales: Vec<Sale>,
}

/// Mirrors the Postgres store: `record_sale` holds one lock for both
/// writes, and a failure leaves the state untouched.
#[derive(Clone, Default)]
struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    fail_on_record: Arc<AtomicBool>,
}

impl MemoryStore {
    fn with_event(self, id: i64, capacity: i32) -> Self {
        self.state.lock().unwrap().events.insert(
            id,
            EventSummary {
                id,
                title: format!("Event {id}"),
                event_date: NaiveDate::from_ymd_opt(2026, 11, 20).unwrap(),
                capacity,
            },
        );
        self
    }

    fn with_user(self, user_id: i64, card_id: i64) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.users.insert(user_id);
            state.cards.insert(card_id, user_id);
        }
        self
    }

    fn capacity(&self, event_id: i64) -> i32 {
        self.state.lock().unwrap().events[&event_id].capacity
    }

    fn sale_count(&self) -> usize {
        self.state.lock().unwrap().sales.len()
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn find_event(&self, event_id: i64) -> Result<Option<EventSummary>, StoreError> {
        Ok(self.state.lock().unwrap().events.get(&event_id).cloned())
    }

    async fn user_exists(&self, user_id: i64) -> Result<bool, StoreError> {
        Ok(self.state.lock().unwrap().users.contains(&user_id))
    }

    async fn card_belongs_to(&self, card_id: i64, user_id: i64) -> Result<bool, StoreError> {
        Ok(self.state.lock().unwrap().cards.get(&card_id) == Some(&user_id))
    }

    async fn sale_exists(&self, event_id: i64, user_id: i64) -> Result<bool, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .sales
            .iter()
            .any(|s| s.event_id == event_id && s.user_id == user_id))
    }

    async fn record_sale(&self, sale: NewSale) -> Result<SaleOutcome, StoreError> {
        let mut state = self.state.lock().unwrap();

        if self.fail_on_record.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("simulated write failure".to_string()));
        }

        if state
            .sales
            .iter()
            .any(|s| s.event_id == sale.event_id && s.user_id == sale.user_id)
        {
            return Ok(SaleOutcome::AlreadyRegistered);
        }

        let Some(event) = state.events.get(&sale.event_id).cloned() else {
            return Err(StoreError::Backend("event vanished".to_string()));
        };
        if event.capacity <= 0 {
            return Ok(SaleOutcome::CapacityExhausted);
        }

        let recorded = Sale {
            id: state.sales.len() as i64 + 1,
            event_id: sale.event_id,
            user_id: sale.user_id,
            card_id: sale.card_id,
            amount: sale.amount,
            created_at: Utc::now(),
        };
        state.sales.push(recorded.clone());

        let event = state
            .events
            .get_mut(&sale.event_id)
            .map(|e| {
                e.capacity -= 1;
                e.clone()
            })
            .ok_or_else(|| StoreError::Backend("event vanished".to_string()))?;

        Ok(SaleOutcome::Recorded {
            sale: recorded,
            event,
        })
    }
}

fn caller(user_id: i64) -> RequestContext {
    RequestContext::new()
        .with_request_user(user_id)
        .with_correlation_id(uuid::Uuid::new_v4())
}

fn command(event_id: i64, user_id: i64, card_id: i64) -> RegisterForEventCommand {
    RegisterForEventCommand::new(event_id, user_id, card_id, dec!(49.99))
}

// =========================================================================
// Happy path and duplicates
// =========================================================================

#[tokio::test]
async fn test_register_then_duplicate_conflicts() {
    let store = MemoryStore::default().with_event(1, 5).with_user(7, 70);
    let handler = RegisterForEventHandler::new(store.clone());

    let result = handler.execute(command(1, 7, 70), &caller(7)).await.unwrap();
    assert_eq!(result.sale.event_id, 1);
    assert_eq!(result.sale.user_id, 7);
    assert_eq!(result.sale.amount, dec!(49.99));
    assert_eq!(result.event.capacity, 4);
    assert_eq!(store.capacity(1), 4);

    let err = handler.execute(command(1, 7, 70), &caller(7)).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::AlreadyRegistered { event_id: 1, user_id: 7 })
    ));
    assert_eq!(err.status(), StatusCode::CONFLICT);
    assert_eq!(store.capacity(1), 4);
    assert_eq!(store.sale_count(), 1);
}

#[tokio::test]
async fn test_capacity_zero_rejected() {
    let store = MemoryStore::default().with_event(1, 0).with_user(7, 70);
    let handler = RegisterForEventHandler::new(store.clone());

    let err = handler.execute(command(1, 7, 70), &caller(7)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExhausted);
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.sale_count(), 0);
    assert_eq!(store.capacity(1), 0);
}

#[tokio::test]
async fn test_last_seat_then_exhausted() {
    let store = MemoryStore::default()
        .with_event(1, 1)
        .with_user(7, 70)
        .with_user(8, 80);
    let handler = RegisterForEventHandler::new(store.clone());

    let result = handler.execute(command(1, 7, 70), &caller(7)).await.unwrap();
    assert_eq!(result.event.capacity, 0);

    let err = handler.execute(command(1, 8, 80), &caller(8)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExhausted);
    assert_eq!(store.sale_count(), 1);
}

// =========================================================================
// Precondition order
// =========================================================================

#[tokio::test]
async fn test_invalid_arguments() {
    let store = MemoryStore::default().with_event(1, 5).with_user(7, 70);
    let handler = RegisterForEventHandler::new(store.clone());

    let err = handler.execute(command(0, 7, 70), &caller(7)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = handler.execute(command(1, 7, -3), &caller(7)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    for amount in [dec!(0), dec!(-10), dec!(1.234)] {
        let cmd = RegisterForEventCommand::new(1, 7, 70, amount);
        let err = handler.execute(cmd, &caller(7)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument, "amount {amount}");
    }

    assert_eq!(store.sale_count(), 0);
}

#[tokio::test]
async fn test_missing_event_reported_first() {
    // neither the event nor the user exists
    let store = MemoryStore::default();
    let handler = RegisterForEventHandler::new(store);

    let err = handler.execute(command(9, 7, 70), &caller(7)).await.unwrap_err();
    assert!(matches!(err, AppError::Domain(DomainError::EventNotFound(9))));
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_capacity_checked_before_user() {
    let store = MemoryStore::default().with_event(1, 0);
    let handler = RegisterForEventHandler::new(store);

    let err = handler.execute(command(1, 7, 70), &caller(7)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExhausted);
}

#[tokio::test]
async fn test_missing_user() {
    let store = MemoryStore::default().with_event(1, 3);
    let handler = RegisterForEventHandler::new(store);

    let err = handler.execute(command(1, 7, 70), &caller(7)).await.unwrap_err();
    assert!(matches!(err, AppError::Domain(DomainError::UserNotFound(7))));
}

#[tokio::test]
async fn test_card_of_another_user_not_found() {
    let store = MemoryStore::default()
        .with_event(1, 3)
        .with_user(7, 70)
        .with_user(8, 80);
    let handler = RegisterForEventHandler::new(store.clone());

    let err = handler.execute(command(1, 7, 80), &caller(7)).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::CardNotFound { card_id: 80, user_id: 7 })
    ));
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.capacity(1), 3);
}

#[tokio::test]
async fn test_caller_must_match_user() {
    let store = MemoryStore::default().with_event(1, 3).with_user(7, 70);
    let handler = RegisterForEventHandler::new(store.clone());

    let err = handler.execute(command(1, 7, 70), &caller(8)).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    let err = handler
        .execute(command(1, 7, 70), &RequestContext::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(store.sale_count(), 0);
}

#[tokio::test]
async fn test_non_positive_user_id_rejected_before_caller_check() {
    let store = MemoryStore::default().with_event(1, 3).with_user(7, 70);
    let handler = RegisterForEventHandler::new(store.clone());

    for user_id in [0, -1] {
        let err = handler
            .execute(command(1, user_id, 70), &caller(7))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument, "user id {user_id}");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    // Anonymous callers still get the argument error first
    let err = handler
        .execute(command(1, 0, 70), &RequestContext::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    assert_eq!(store.sale_count(), 0);
}

#[tokio::test]
async fn test_save_card_validates_before_caller_check() {
    // Never connects: validation fails before a transaction is opened
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://localhost/unused")
        .unwrap();
    let handler = SaveCardHandler::new(pool);

    let card = |user_id: i64| {
        SaveCardCommand::new(
            user_id,
            "4111111111111111".to_string(),
            "12/30".to_string(),
            "123".to_string(),
            "Ana Lopez".to_string(),
        )
    };

    let err = handler.execute(card(0), &caller(7)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = handler.execute(card(-5), &RequestContext::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    // A valid id owned by someone else is still forbidden
    let err = handler.execute(card(8), &caller(7)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

// =========================================================================
// Atomic step failures
// =========================================================================

#[tokio::test]
async fn test_store_failure_is_internal_and_leaves_no_trace() {
    let store = MemoryStore::default().with_event(1, 3).with_user(7, 70);
    store.fail_on_record.store(true, Ordering::SeqCst);
    let handler = RegisterForEventHandler::new(store.clone());

    let err = handler.execute(command(1, 7, 70), &caller(7)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(err.client_message(), "Internal server error");
    assert_eq!(store.sale_count(), 0);
    assert_eq!(store.capacity(1), 3);

    // the failure is not sticky
    store.fail_on_record.store(false, Ordering::SeqCst);
    let result = handler.execute(command(1, 7, 70), &caller(7)).await.unwrap();
    assert_eq!(result.event.capacity, 2);
}

// =========================================================================
// Concurrency
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_registrations_never_oversell() {
    const CAPACITY: i32 = 10;
    const CALLERS: i64 = 50;

    let mut store = MemoryStore::default().with_event(1, CAPACITY);
    for user_id in 1..=CALLERS {
        store = store.with_user(user_id, 1000 + user_id);
    }
    let handler = Arc::new(RegisterForEventHandler::new(store.clone()));

    let tasks: Vec<_> = (1..=CALLERS)
        .map(|user_id| {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                handler
                    .execute(command(1, user_id, 1000 + user_id), &caller(user_id))
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    let mut rejected = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(result) => {
                assert!(result.event.capacity >= 0);
                successes += 1;
            }
            Err(err) => {
                assert!(
                    matches!(err.kind(), ErrorKind::CapacityExhausted | ErrorKind::Conflict),
                    "unexpected error: {err:?}"
                );
                rejected += 1;
            }
        }
    }

    assert_eq!(successes, CAPACITY as usize);
    assert_eq!(rejected, (CALLERS - CAPACITY as i64) as usize);
    assert_eq!(store.capacity(1), 0);
    assert_eq!(store.sale_count(), CAPACITY as usize);
}

// =========================================================================
// Commands and helpers
// =========================================================================

#[test]
fn test_register_command() {
    let cmd = RegisterForEventCommand::new(1, 2, 3, dec!(10.00));
    assert_eq!(cmd.event_id, 1);
    assert_eq!(cmd.user_id, 2);
    assert_eq!(cmd.card_id, 3);
    assert_eq!(cmd.amount, dec!(10.00));
}

#[test]
fn test_update_profile_command_builder() {
    let cmd = UpdateProfileCommand::new().with_last_name("Lopez".to_string());
    assert!(cmd.first_name.is_none());
    assert_eq!(cmd.last_name.as_deref(), Some("Lopez"));
}

#[test]
fn test_card_outcome_messages() {
    assert_eq!(CardOutcome::Created.message(), "Card created successfully");
    assert_eq!(CardOutcome::Updated.message(), "Card updated successfully");
}

#[test]
fn test_ensure_caller() {
    assert!(ensure_caller(&caller(5), 5).is_ok());
    assert!(matches!(ensure_caller(&caller(5), 6), Err(AppError::Forbidden(_))));
    assert!(matches!(
        ensure_caller(&RequestContext::new(), 5),
        Err(AppError::Unauthorized(_))
    ));
}
