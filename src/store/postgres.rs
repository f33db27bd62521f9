use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::Database;
use crate::models::{NewOrder, Order, OrderChanges, OrderItem, OrderStatus};

use super::{ClientCounter, OrderFilter, OrderSort, OrderStore, StoreError};

/// The enum is bound as a Postgres array in `status = ANY($n)` queries, so it
/// must name its array type. The array of a custom enum `order_status` is
/// `_order_status` by Postgres convention.
impl sqlx::postgres::PgHasArrayType for OrderStatus {
    fn array_type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("_order_status")
    }
}

/// Postgres-backed order store. Items live in a JSONB column on the order
/// row, so every create/update lands items and total in one statement.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: Database,
}

impl PgOrderStore {
    pub fn new(pool: Database) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct OrderRow {
    id: Uuid,
    owner_id: Uuid,
    client_name: String,
    delivery_date: NaiveDate,
    delivery_time: Option<NaiveTime>,
    items: Json<Vec<OrderItem>>,
    total_price: Decimal,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            owner_id: row.owner_id,
            client_name: row.client_name,
            delivery_date: row.delivery_date,
            delivery_time: row.delivery_time,
            items: row.items.0,
            total_price: row.total_price,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

const ORDER_COLUMNS: &str =
    "id, owner_id, client_name, delivery_date, delivery_time, items, total_price, status, created_at";

fn order_clause(sort: OrderSort) -> &'static str {
    match sort {
        OrderSort::DeliveryAsc => "delivery_date ASC, created_at ASC",
        OrderSort::DeliveryDesc => "delivery_date DESC, created_at DESC",
    }
}

/// Build the conjunctive WHERE clause for a filter. `$1` is always the
/// owner; further placeholders are numbered in the order the caller must
/// bind them (statuses first, then delivery date).
fn where_clause(filter: &OrderFilter) -> String {
    let mut conditions = vec!["owner_id = $1".to_string()];
    let mut bind_count = 2;

    if filter.statuses.is_some() {
        conditions.push(format!("status = ANY(${})", bind_count));
        bind_count += 1;
    }

    if filter.delivery_date.is_some() {
        conditions.push(format!("delivery_date = ${}", bind_count));
    }

    conditions.join(" AND ")
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            INSERT INTO orders (owner_id, client_name, delivery_date, delivery_time, items, total_price, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(order.owner_id)
        .bind(&order.client_name)
        .bind(order.delivery_date)
        .bind(order.delivery_time)
        .bind(Json(&order.items))
        .bind(order.total_price)
        .bind(OrderStatus::Pending)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE id = $1 AND owner_id = $2",
            ORDER_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: OrderChanges,
    ) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE orders
            SET client_name = $3, delivery_date = $4, delivery_time = $5, items = $6, total_price = $7
            WHERE id = $1 AND owner_id = $2
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .bind(&changes.client_name)
        .bind(changes.delivery_date)
        .bind(changes.delivery_time)
        .bind(Json(&changes.items))
        .bind(changes.total_price)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    async fn set_status(
        &self,
        owner_id: Uuid,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $3 WHERE id = $1 AND owner_id = $2 RETURNING {}",
            ORDER_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn query(
        &self,
        owner_id: Uuid,
        filter: OrderFilter,
        sort: OrderSort,
    ) -> Result<Vec<Order>, StoreError> {
        let sql = format!(
            "SELECT {} FROM orders WHERE {} ORDER BY {}",
            ORDER_COLUMNS,
            where_clause(&filter),
            order_clause(sort)
        );

        let mut query = sqlx::query_as::<_, OrderRow>(&sql).bind(owner_id);
        if let Some(statuses) = &filter.statuses {
            query = query.bind(statuses.clone());
        }
        if let Some(date) = filter.delivery_date {
            query = query.bind(date);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn count(&self, owner_id: Uuid, filter: OrderFilter) -> Result<i64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM orders WHERE {}", where_clause(&filter));

        let mut query = sqlx::query_scalar::<_, i64>(&sql).bind(owner_id);
        if let Some(statuses) = &filter.statuses {
            query = query.bind(statuses.clone());
        }
        if let Some(date) = filter.delivery_date {
            query = query.bind(date);
        }

        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn completed_revenue(&self, owner_id: Uuid) -> Result<Decimal, StoreError> {
        let revenue = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(total_price), 0) FROM orders WHERE owner_id = $1 AND status = $2",
        )
        .bind(owner_id)
        .bind(OrderStatus::Completed)
        .fetch_one(&self.pool)
        .await?;

        Ok(revenue)
    }
}

#[async_trait]
impl ClientCounter for Database {
    async fn count_clients(&self, owner_id: Uuid) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clients WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(self)
            .await?;

        Ok(count)
    }
}
