use std::sync::Arc;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{order_total, NewOrder, Order, OrderChanges, OrderDraft, OrderStatus};
use crate::store::{OrderFilter, OrderSort, OrderStore};

/// Published on every successful order write. Cached views and aggregates
/// for the owner must be invalidated before they are served again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderEvent {
    pub owner_id: Uuid,
}

const OPEN_STATUSES: [OrderStatus; 2] = [OrderStatus::Pending, OrderStatus::InProgress];

/// Order lifecycle and view queries over an [`OrderStore`]. All operations
/// take the owner explicitly; there is no ambient current user down here.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    events: broadcast::Sender<OrderEvent>,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self { store, events }
    }

    /// Subscribe to the change feed. Only events sent after this call are
    /// delivered.
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.events.subscribe()
    }

    fn notify(&self, owner_id: Uuid) {
        // No receivers is fine; the feed is best-effort fan-out.
        let _ = self.events.send(OrderEvent { owner_id });
    }

    /// Orders still being worked on, earliest delivery first.
    pub async fn in_progress(&self, owner_id: Uuid) -> Result<Vec<Order>, AppError> {
        let orders = self
            .store
            .query(
                owner_id,
                OrderFilter::with_statuses(&OPEN_STATUSES),
                OrderSort::DeliveryAsc,
            )
            .await?;
        Ok(orders)
    }

    /// Fulfilled orders, most recently delivered first.
    pub async fn completed(&self, owner_id: Uuid) -> Result<Vec<Order>, AppError> {
        let orders = self
            .store
            .query(
                owner_id,
                OrderFilter::with_statuses(&[OrderStatus::Completed]),
                OrderSort::DeliveryDesc,
            )
            .await?;
        Ok(orders)
    }

    /// Every order of the owner, ordered like the in-progress view.
    pub async fn all(&self, owner_id: Uuid) -> Result<Vec<Order>, AppError> {
        let orders = self
            .store
            .query(owner_id, OrderFilter::default(), OrderSort::DeliveryAsc)
            .await?;
        Ok(orders)
    }

    pub async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Order, AppError> {
        self.store
            .get(owner_id, id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Validate and persist a new order. The total is computed here from the
    /// submitted items; whatever total a client may believe in never reaches
    /// the store.
    pub async fn create(&self, owner_id: Uuid, draft: OrderDraft) -> Result<Order, AppError> {
        draft.validate()?;
        let total_price = order_total(&draft.items);
        let order = self
            .store
            .create(NewOrder {
                owner_id,
                client_name: draft.client_name,
                delivery_date: draft.delivery_date,
                delivery_time: draft.delivery_time,
                items: draft.items,
                total_price,
            })
            .await?;
        log::info!("order {} created for owner {}", order.id, owner_id);
        self.notify(owner_id);
        Ok(order)
    }

    /// Owner re-edit: replaces the editable fields and recomputes the total
    /// in the same write. Status is untouched.
    pub async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        draft: OrderDraft,
    ) -> Result<Order, AppError> {
        draft.validate()?;
        let total_price = order_total(&draft.items);
        let order = self
            .store
            .update(
                owner_id,
                id,
                OrderChanges {
                    client_name: draft.client_name,
                    delivery_date: draft.delivery_date,
                    delivery_time: draft.delivery_time,
                    items: draft.items,
                    total_price,
                },
            )
            .await?
            .ok_or(AppError::NotFound)?;
        self.notify(owner_id);
        Ok(order)
    }

    /// The one lifecycle transition exposed here: any non-terminal status
    /// moves to `Completed`. Completing an already-completed order is an
    /// idempotent no-op that hands back the unchanged order; a cancelled
    /// order is terminal and the attempt is rejected.
    pub async fn mark_completed(&self, owner_id: Uuid, id: Uuid) -> Result<Order, AppError> {
        let order = self.get(owner_id, id).await?;
        match order.status {
            OrderStatus::Completed => Ok(order),
            OrderStatus::Cancelled => Err(AppError::Conflict(
                "a cancelled order cannot be completed".to_string(),
            )),
            OrderStatus::Pending | OrderStatus::InProgress => {
                let order = self
                    .store
                    .set_status(owner_id, id, OrderStatus::Completed)
                    .await?
                    .ok_or(AppError::NotFound)?;
                log::info!("order {} marked completed", order.id);
                self.notify(owner_id);
                Ok(order)
            }
        }
    }

    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete(owner_id, id).await? {
            return Err(AppError::NotFound);
        }
        log::info!("order {} deleted", id);
        self.notify(owner_id);
        Ok(())
    }
}
