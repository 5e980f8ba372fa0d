use std::sync::Arc;

use sqlx::PgPool;

use super::collection::Collection;
use super::memory::MemCollection;
use super::postgres::PgCollection;

/// Handles to every collection the service touches, built once at startup
/// and passed explicitly into handlers via application state.
#[derive(Clone)]
pub struct DataContext {
    pub users: Arc<dyn Collection>,
    pub pets: Arc<dyn Collection>,
    pub donations: Arc<dyn Collection>,
    pub donation_payments: Arc<dyn Collection>,
    pub adoption_requests: Arc<dyn Collection>,
}

impl DataContext {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgCollection::new("users", pool.clone())),
            pets: Arc::new(PgCollection::new("pets", pool.clone())),
            donations: Arc::new(PgCollection::new("donations", pool.clone())),
            donation_payments: Arc::new(PgCollection::new("donation_payments", pool.clone())),
            adoption_requests: Arc::new(PgCollection::new("adoption_requests", pool)),
        }
    }

    /// In-memory store with the same unique guarantees the Postgres schema
    /// provides. Used by the test suite.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemCollection::new("users").with_unique_key(&["email"])),
            pets: Arc::new(MemCollection::new("pets")),
            donations: Arc::new(MemCollection::new("donations")),
            donation_payments: Arc::new(MemCollection::new("donation_payments")),
            adoption_requests: Arc::new(
                MemCollection::new("adoption_requests")
                    .with_unique_key(&["petId", "adoptedReqByEmail"]),
            ),
        }
    }
}
