use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{NewOrder, Order, OrderChanges, OrderStatus};

use super::{ClientCounter, OrderFilter, OrderSort, OrderStore, StoreError};

/// In-memory order store. Backs the test suite and any run without a
/// database; each operation holds the lock for its whole write, so writes
/// are atomic and never leave a torn order behind.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(order: &Order, owner_id: Uuid, filter: &OrderFilter) -> bool {
    if order.owner_id != owner_id {
        return false;
    }
    if let Some(statuses) = &filter.statuses {
        if !statuses.contains(&order.status) {
            return false;
        }
    }
    if let Some(date) = filter.delivery_date {
        if order.delivery_date != date {
            return false;
        }
    }
    true
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, StoreError> {
        let order = Order {
            id: Uuid::new_v4(),
            owner_id: order.owner_id,
            client_name: order.client_name,
            delivery_date: order.delivery_date,
            delivery_time: order.delivery_time,
            items: order.items,
            total_price: order.total_price,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        self.orders.write().await.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders
            .get(&id)
            .filter(|order| order.owner_id == owner_id)
            .cloned())
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: OrderChanges,
    ) -> Result<Option<Order>, StoreError> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(&id).filter(|order| order.owner_id == owner_id) else {
            return Ok(None);
        };
        order.client_name = changes.client_name;
        order.delivery_date = changes.delivery_date;
        order.delivery_time = changes.delivery_time;
        order.items = changes.items;
        order.total_price = changes.total_price;
        Ok(Some(order.clone()))
    }

    async fn set_status(
        &self,
        owner_id: Uuid,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(&id).filter(|order| order.owner_id == owner_id) else {
            return Ok(None);
        };
        order.status = status;
        Ok(Some(order.clone()))
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut orders = self.orders.write().await;
        match orders.get(&id) {
            Some(order) if order.owner_id == owner_id => {
                orders.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn query(
        &self,
        owner_id: Uuid,
        filter: OrderFilter,
        sort: OrderSort,
    ) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        let mut result: Vec<Order> = orders
            .values()
            .filter(|order| matches(order, owner_id, &filter))
            .cloned()
            .collect();
        match sort {
            OrderSort::DeliveryAsc => {
                result.sort_by_key(|order| (order.delivery_date, order.created_at));
            }
            OrderSort::DeliveryDesc => {
                result.sort_by_key(|order| (order.delivery_date, order.created_at));
                result.reverse();
            }
        }
        Ok(result)
    }

    async fn count(&self, owner_id: Uuid, filter: OrderFilter) -> Result<i64, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders
            .values()
            .filter(|order| matches(order, owner_id, &filter))
            .count() as i64)
    }

    async fn completed_revenue(&self, owner_id: Uuid) -> Result<Decimal, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders
            .values()
            .filter(|order| order.owner_id == owner_id && order.status == OrderStatus::Completed)
            .map(|order| order.total_price)
            .sum())
    }
}

/// In-memory client book, enough to serve the dashboard's client counter.
#[derive(Default)]
pub struct MemoryClientBook {
    names: RwLock<HashMap<Uuid, Vec<String>>>,
}

impl MemoryClientBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_client(&self, owner_id: Uuid, name: &str) {
        self.names
            .write()
            .await
            .entry(owner_id)
            .or_default()
            .push(name.to_string());
    }
}

#[async_trait]
impl ClientCounter for MemoryClientBook {
    async fn count_clients(&self, owner_id: Uuid) -> Result<i64, StoreError> {
        let names = self.names.read().await;
        Ok(names.get(&owner_id).map_or(0, |list| list.len() as i64))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::OrderItem;

    fn new_order(owner_id: Uuid, client: &str, date: NaiveDate) -> NewOrder {
        NewOrder {
            owner_id,
            client_name: client.to_string(),
            delivery_date: date,
            delivery_time: None,
            items: vec![OrderItem {
                dessert_name: "brownie".to_string(),
                quantity: 2,
                unit_price: dec!(4.50),
            }],
            total_price: dec!(9.00),
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[tokio::test]
    async fn create_assigns_identity_and_starts_pending() {
        let store = MemoryOrderStore::new();
        let owner = Uuid::new_v4();
        let a = store.create(new_order(owner, "Noa", date(1))).await.unwrap();
        let b = store.create(new_order(owner, "Tal", date(2))).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.status, OrderStatus::Pending);
        assert_eq!(store.get(owner, a.id).await.unwrap().unwrap().client_name, "Noa");
    }

    #[tokio::test]
    async fn lookups_are_scoped_by_owner() {
        let store = MemoryOrderStore::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let order = store.create(new_order(owner, "Noa", date(1))).await.unwrap();

        assert!(store.get(stranger, order.id).await.unwrap().is_none());
        assert!(store
            .set_status(stranger, order.id, OrderStatus::Completed)
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete(stranger, order.id).await.unwrap());
        // The foreign attempts changed nothing.
        let unchanged = store.get(owner, order.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn query_filters_by_status_and_date() {
        let store = MemoryOrderStore::new();
        let owner = Uuid::new_v4();
        let a = store.create(new_order(owner, "Noa", date(1))).await.unwrap();
        let _b = store.create(new_order(owner, "Tal", date(2))).await.unwrap();
        store
            .set_status(owner, a.id, OrderStatus::Completed)
            .await
            .unwrap();

        let completed = store
            .query(
                owner,
                OrderFilter::with_statuses(&[OrderStatus::Completed]),
                OrderSort::DeliveryDesc,
            )
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, a.id);

        let on_second = store
            .count(owner, OrderFilter::delivered_on(date(2)))
            .await
            .unwrap();
        assert_eq!(on_second, 1);
    }

    #[tokio::test]
    async fn query_sorts_by_delivery_then_creation() {
        let store = MemoryOrderStore::new();
        let owner = Uuid::new_v4();
        let late = store.create(new_order(owner, "late", date(20))).await.unwrap();
        let early_first = store.create(new_order(owner, "first", date(5))).await.unwrap();
        let early_second = store.create(new_order(owner, "second", date(5))).await.unwrap();

        let ascending = store
            .query(owner, OrderFilter::default(), OrderSort::DeliveryAsc)
            .await
            .unwrap();
        let ids: Vec<Uuid> = ascending.iter().map(|order| order.id).collect();
        assert_eq!(ids, vec![early_first.id, early_second.id, late.id]);

        let descending = store
            .query(owner, OrderFilter::default(), OrderSort::DeliveryDesc)
            .await
            .unwrap();
        assert_eq!(descending[0].id, late.id);
    }

    #[tokio::test]
    async fn completed_revenue_ignores_other_statuses_and_owners() {
        let store = MemoryOrderStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let done = store.create(new_order(owner, "Noa", date(1))).await.unwrap();
        let _open = store.create(new_order(owner, "Tal", date(2))).await.unwrap();
        let foreign = store.create(new_order(other, "Gil", date(1))).await.unwrap();
        store
            .set_status(owner, done.id, OrderStatus::Completed)
            .await
            .unwrap();
        store
            .set_status(other, foreign.id, OrderStatus::Completed)
            .await
            .unwrap();

        assert_eq!(store.completed_revenue(owner).await.unwrap(), dec!(9.00));
    }
}
