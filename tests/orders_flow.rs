//! End-to-end flow over the public crate surface: two owners run their
//! order books side by side against the in-memory store, and the dashboard
//! summary tracks every write through the change feed.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use uuid::Uuid;

use bakehouse::error::AppError;
use bakehouse::models::{order_total, OrderDraft, OrderItem, OrderStatus};
use bakehouse::orders::OrderService;
use bakehouse::store::{ClientCounter, MemoryClientBook, MemoryOrderStore};
use bakehouse::summary::SummaryCache;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
}

fn item(name: &str, quantity: i32, unit_price: rust_decimal::Decimal) -> OrderItem {
    OrderItem {
        dessert_name: name.to_string(),
        quantity,
        unit_price,
    }
}

fn draft(client: &str, day: u32, items: Vec<OrderItem>) -> OrderDraft {
    OrderDraft {
        client_name: client.to_string(),
        delivery_date: date(day),
        delivery_time: None,
        items,
    }
}

#[tokio::test]
async fn two_owners_run_independent_order_books() {
    let store = Arc::new(MemoryOrderStore::new());
    let book = Arc::new(MemoryClientBook::new());
    let service = OrderService::new(store.clone());
    let summaries = SummaryCache::new(store, book.clone(), service.subscribe());

    let alona = Uuid::new_v4();
    let boaz = Uuid::new_v4();
    let today = date(10);

    // Alona takes a wedding order due today, still pending.
    let wedding = service
        .create(
            alona,
            draft(
                "Levi wedding",
                10,
                vec![item("chocolate cake", 2, dec!(15.50)), item("lemon tart", 1, dec!(8.00))],
            ),
        )
        .await
        .unwrap();
    assert_eq!(wedding.total_price, dec!(39.00));
    book.add_client(alona, "Levi family").await;

    // Boaz delivers a birthday order today and completes it.
    let birthday = service
        .create(boaz, draft("Mor birthday", 10, vec![item("babka", 3, dec!(13.00))]))
        .await
        .unwrap();
    service.mark_completed(boaz, birthday.id).await.unwrap();

    // Views never cross tenants.
    let alona_open = service.in_progress(alona).await.unwrap();
    assert_eq!(alona_open.len(), 1);
    assert!(alona_open.iter().all(|order| order.owner_id == alona));
    assert!(service.completed(alona).await.unwrap().is_empty());
    let boaz_completed = service.completed(boaz).await.unwrap();
    assert_eq!(boaz_completed.len(), 1);
    assert_eq!(boaz_completed[0].id, birthday.id);

    // The summaries see the same split.
    let for_alona = summaries.get(alona, today).await.unwrap();
    assert_eq!(for_alona.today, 1);
    assert_eq!(for_alona.pending, 1);
    assert_eq!(for_alona.completed, 0);
    assert_eq!(for_alona.total_revenue, dec!(0));
    assert_eq!(for_alona.total_clients, 1);

    let for_boaz = summaries.get(boaz, today).await.unwrap();
    assert_eq!(for_boaz.today, 1);
    assert_eq!(for_boaz.completed, 1);
    assert_eq!(for_boaz.total_revenue, dec!(39.00));
    assert_eq!(for_boaz.total_clients, 0);
}

#[tokio::test]
async fn edits_keep_the_stored_total_in_sync_and_refresh_the_summary() {
    let store = Arc::new(MemoryOrderStore::new());
    let book = Arc::new(MemoryClientBook::new());
    let service = OrderService::new(store.clone());
    let summaries = SummaryCache::new(store, book, service.subscribe());

    let owner = Uuid::new_v4();
    let today = date(10);

    let order = service
        .create(owner, draft("Noa", 10, vec![item("brownie", 2, dec!(4.00))]))
        .await
        .unwrap();
    service.mark_completed(owner, order.id).await.unwrap();
    assert_eq!(summaries.get(owner, today).await.unwrap().total_revenue, dec!(8.00));

    // Re-edit the completed order; the total follows the items and the
    // cached summary is recomputed.
    let updated = service
        .update(
            owner,
            order.id,
            draft("Noa", 10, vec![item("brownie", 2, dec!(4.00)), item("macaron box", 1, dec!(24.00))]),
        )
        .await
        .unwrap();
    assert_eq!(updated.total_price, order_total(&updated.items));
    assert_eq!(updated.status, OrderStatus::Completed);
    assert_eq!(summaries.get(owner, today).await.unwrap().total_revenue, dec!(32.00));
}

#[tokio::test]
async fn the_lifecycle_transition_is_safe_to_repeat_but_not_to_cross_tenants() {
    let store = Arc::new(MemoryOrderStore::new());
    let service = OrderService::new(store);

    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    let order = service
        .create(owner, draft("Noa", 10, vec![item("brownie", 1, dec!(4.00))]))
        .await
        .unwrap();

    let done = service.mark_completed(owner, order.id).await.unwrap();
    let again = service.mark_completed(owner, order.id).await.unwrap();
    assert_eq!(again, done);

    assert!(matches!(
        service.mark_completed(stranger, order.id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn the_client_counter_is_scoped_per_owner() {
    let book = MemoryClientBook::new();
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();

    book.add_client(owner, "Levi family").await;
    book.add_client(owner, "Mor").await;

    assert_eq!(book.count_clients(owner).await.unwrap(), 2);
    assert_eq!(book.count_clients(other).await.unwrap(), 0);
}
