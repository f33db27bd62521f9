pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewOrder, Order, OrderChanges, OrderStatus};

pub use memory::{MemoryClientBook, MemoryOrderStore};
pub use postgres::PgOrderStore;

/// Failure of the persistence boundary itself. Surfaced to callers as a
/// retryable condition; retry policy belongs to the caller, not here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Row predicate for order queries. Both fields are conjunctive; an empty
/// filter matches every order of the owner.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub statuses: Option<Vec<OrderStatus>>,
    pub delivery_date: Option<NaiveDate>,
}

impl OrderFilter {
    pub fn with_statuses(statuses: &[OrderStatus]) -> Self {
        OrderFilter {
            statuses: Some(statuses.to_vec()),
            delivery_date: None,
        }
    }

    pub fn delivered_on(date: NaiveDate) -> Self {
        OrderFilter {
            statuses: None,
            delivery_date: Some(date),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSort {
    /// Earliest delivery first, creation time as tie-break.
    DeliveryAsc,
    /// Most recent delivery first.
    DeliveryDesc,
}

/// Persistence boundary for orders. Every operation is scoped by the owning
/// user: a lookup with the wrong owner behaves exactly like a missing row,
/// so nothing about other tenants' data can be observed through this trait.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order. The store assigns id and creation timestamp and
    /// starts the order in `Pending`.
    async fn create(&self, order: NewOrder) -> Result<Order, StoreError>;

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Order>, StoreError>;

    /// Replace the editable fields of an order in one atomic write. Returns
    /// `None` when the order does not exist for this owner.
    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: OrderChanges,
    ) -> Result<Option<Order>, StoreError>;

    /// Set the status without touching items, total or dates.
    async fn set_status(
        &self,
        owner_id: Uuid,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError>;

    /// Returns whether a row was actually removed.
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, StoreError>;

    async fn query(
        &self,
        owner_id: Uuid,
        filter: OrderFilter,
        sort: OrderSort,
    ) -> Result<Vec<Order>, StoreError>;

    async fn count(&self, owner_id: Uuid, filter: OrderFilter) -> Result<i64, StoreError>;

    /// Sum of `total_price` over this owner's completed orders.
    async fn completed_revenue(&self, owner_id: Uuid) -> Result<Decimal, StoreError>;
}

/// The one capability the dashboard needs from the client book.
#[async_trait]
pub trait ClientCounter: Send + Sync {
    async fn count_clients(&self, owner_id: Uuid) -> Result<i64, StoreError>;
}
