use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Order status lifecycle. `Pending` is the initial state; `Completed` and
/// `Cancelled` are terminal. The only transition this service exposes is
/// "mark as completed" — `Pending -> InProgress` is driven outside of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

/// One dessert line within an order. Items have no identity of their own and
/// are persisted as part of the order row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub dessert_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderItem {
    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub client_name: String,
    pub delivery_date: NaiveDate,
    pub delivery_time: Option<NaiveTime>,
    pub items: Vec<OrderItem>,
    /// Derived: always equals the sum of item subtotals. Kept on the row so
    /// revenue aggregation can run without loading item sets.
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Order total at full `Decimal` precision. Rounding to monetary precision
/// (2 decimal places) is a presentation concern and happens at the edge,
/// never inside the accumulation.
pub fn order_total(items: &[OrderItem]) -> Decimal {
    items.iter().map(OrderItem::subtotal).sum()
}

/// What a caller submits to create or re-edit an order. Carries no total
/// and no status: the total is always recomputed from the items, and status
/// changes only travel through the lifecycle transition.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderDraft {
    pub client_name: String,
    pub delivery_date: NaiveDate,
    pub delivery_time: Option<NaiveTime>,
    pub items: Vec<OrderItem>,
}

impl OrderDraft {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.client_name.trim().is_empty() {
            return Err(AppError::Validation("client name must not be empty".into()));
        }
        if self.items.is_empty() {
            return Err(AppError::Validation(
                "an order needs at least one item".into(),
            ));
        }
        for item in &self.items {
            if item.dessert_name.trim().is_empty() {
                return Err(AppError::Validation("dessert name must not be empty".into()));
            }
            if item.quantity < 1 {
                return Err(AppError::Validation(format!(
                    "quantity must be at least 1, got {}",
                    item.quantity
                )));
            }
            if item.unit_price < Decimal::ZERO {
                return Err(AppError::Validation(format!(
                    "unit price must not be negative, got {}",
                    item.unit_price
                )));
            }
        }
        Ok(())
    }
}

/// Validated record handed to the store at creation. The store assigns the
/// id and creation timestamp; the status starts at `Pending`.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub owner_id: Uuid,
    pub client_name: String,
    pub delivery_date: NaiveDate,
    pub delivery_time: Option<NaiveTime>,
    pub items: Vec<OrderItem>,
    pub total_price: Decimal,
}

/// Validated field replacement for an owner re-edit. Status is deliberately
/// absent; see `OrderDraft`.
#[derive(Debug, Clone)]
pub struct OrderChanges {
    pub client_name: String,
    pub delivery_date: NaiveDate,
    pub delivery_time: Option<NaiveTime>,
    pub items: Vec<OrderItem>,
    pub total_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(name: &str, quantity: i32, unit_price: Decimal) -> OrderItem {
        OrderItem {
            dessert_name: name.to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn total_sums_quantity_times_unit_price() {
        let items = vec![
            item("chocolate cake", 2, dec!(15.50)),
            item("lemon tart", 1, dec!(8.00)),
        ];
        assert_eq!(order_total(&items), dec!(39.00));
    }

    #[test]
    fn free_items_contribute_zero() {
        let items = vec![
            item("tasting sample", 3, dec!(0)),
            item("macaron box", 1, dec!(24.90)),
        ];
        assert_eq!(order_total(&items), dec!(24.90));
    }

    #[test]
    fn accumulation_keeps_full_precision_until_rounded() {
        // Three subtotals of 0.015 each: rounding only at the end gives
        // 0.045 -> 0.04, while rounding each subtotal first would give 0.06.
        let items = vec![
            item("sprinkles", 1, dec!(0.015)),
            item("sprinkles", 1, dec!(0.015)),
            item("sprinkles", 1, dec!(0.015)),
        ];
        let total = order_total(&items);
        assert_eq!(total, dec!(0.045));
        assert_eq!(total.round_dp(2), dec!(0.04));
    }

    #[test]
    fn empty_item_list_is_rejected() {
        let draft = OrderDraft {
            client_name: "Noa".to_string(),
            delivery_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            delivery_time: None,
            items: vec![],
        };
        assert!(matches!(draft.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn blank_client_name_is_rejected() {
        let draft = OrderDraft {
            client_name: "   ".to_string(),
            delivery_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            delivery_time: None,
            items: vec![item("brownie", 1, dec!(3.50))],
        };
        assert!(matches!(draft.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn zero_quantity_and_negative_price_are_rejected() {
        let base = OrderDraft {
            client_name: "Noa".to_string(),
            delivery_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            delivery_time: None,
            items: vec![item("brownie", 0, dec!(3.50))],
        };
        assert!(matches!(base.validate(), Err(AppError::Validation(_))));

        let negative = OrderDraft {
            items: vec![item("brownie", 1, dec!(-0.01))],
            ..base
        };
        assert!(matches!(negative.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn zero_unit_price_is_valid() {
        let draft = OrderDraft {
            client_name: "Noa".to_string(),
            delivery_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            delivery_time: None,
            items: vec![item("birthday gift", 1, dec!(0))],
        };
        assert!(draft.validate().is_ok());
    }
}
