use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::error::AppError;
use crate::orders::OrderEvent;
use crate::store::{ClientCounter, OrderFilter, OrderStore, StoreError};
use crate::models::OrderStatus;

/// The dashboard counters. Each field is independently correct as of its
/// own read; the aggregator does not promise one consistent snapshot
/// across all six. `degraded` is set when any individual read failed and
/// was zeroed instead of failing the whole summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub today: i64,
    pub tomorrow: i64,
    pub pending: i64,
    pub completed: i64,
    pub total_revenue: Decimal,
    pub total_clients: i64,
    pub degraded: bool,
}

fn note<T: Default>(
    what: &str,
    owner_id: Uuid,
    result: Result<T, StoreError>,
    failures: &mut u32,
    last_error: &mut Option<StoreError>,
) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            log::warn!("summary: {} read failed for owner {}: {}", what, owner_id, err);
            *failures += 1;
            *last_error = Some(err);
            T::default()
        }
    }
}

/// Compute the dashboard summary for one owner. `today` is injected by the
/// caller so date bucketing stays deterministic under test. Revenue counts
/// completed orders only and is rounded to monetary precision here, at the
/// presentation edge.
pub async fn summarize(
    store: &dyn OrderStore,
    clients: &dyn ClientCounter,
    owner_id: Uuid,
    today: NaiveDate,
) -> Result<Summary, AppError> {
    let mut failures = 0u32;
    let mut last_error = None;
    let mut attempted = 6u32;

    let today_count = note(
        "today count",
        owner_id,
        store.count(owner_id, OrderFilter::delivered_on(today)).await,
        &mut failures,
        &mut last_error,
    );
    let tomorrow = match today.succ_opt() {
        Some(next) => note(
            "tomorrow count",
            owner_id,
            store.count(owner_id, OrderFilter::delivered_on(next)).await,
            &mut failures,
            &mut last_error,
        ),
        // Calendar overflow; nothing can be scheduled past it.
        None => {
            attempted -= 1;
            0
        }
    };
    let pending = note(
        "pending count",
        owner_id,
        store
            .count(owner_id, OrderFilter::with_statuses(&[OrderStatus::Pending]))
            .await,
        &mut failures,
        &mut last_error,
    );
    let completed = note(
        "completed count",
        owner_id,
        store
            .count(owner_id, OrderFilter::with_statuses(&[OrderStatus::Completed]))
            .await,
        &mut failures,
        &mut last_error,
    );
    let revenue = note(
        "revenue",
        owner_id,
        store.completed_revenue(owner_id).await,
        &mut failures,
        &mut last_error,
    );
    let total_clients = note(
        "client count",
        owner_id,
        clients.count_clients(owner_id).await,
        &mut failures,
        &mut last_error,
    );

    if failures == attempted {
        if let Some(err) = last_error {
            return Err(AppError::Store(err));
        }
    }

    Ok(Summary {
        today: today_count,
        tomorrow,
        pending,
        completed,
        total_revenue: revenue.round_dp(2),
        total_clients,
        degraded: failures > 0,
    })
}

/// Per-owner summary cache wired to the order change feed. Invalidation is
/// lazy: pending events are drained at read time, so there is no background
/// listener and a write that returned before the read began is always
/// reflected. Entries are keyed by the computed date as well, so a day
/// rollover recomputes the today/tomorrow buckets.
pub struct SummaryCache {
    store: Arc<dyn OrderStore>,
    clients: Arc<dyn ClientCounter>,
    events: Mutex<broadcast::Receiver<OrderEvent>>,
    cache: Mutex<HashMap<Uuid, (NaiveDate, Summary)>>,
}

impl SummaryCache {
    pub fn new(
        store: Arc<dyn OrderStore>,
        clients: Arc<dyn ClientCounter>,
        events: broadcast::Receiver<OrderEvent>,
    ) -> Self {
        Self {
            store,
            clients,
            events: Mutex::new(events),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, owner_id: Uuid, today: NaiveDate) -> Result<Summary, AppError> {
        self.drain_events().await;

        {
            let cache = self.cache.lock().await;
            if let Some((cached_for, summary)) = cache.get(&owner_id) {
                if *cached_for == today {
                    return Ok(summary.clone());
                }
            }
        }

        let summary = summarize(
            self.store.as_ref(),
            self.clients.as_ref(),
            owner_id,
            today,
        )
        .await?;

        // A degraded summary is not cached: the next read should retry the
        // failed counts instead of pinning zeroes.
        if !summary.degraded {
            self.cache
                .lock()
                .await
                .insert(owner_id, (today, summary.clone()));
        }

        Ok(summary)
    }

    async fn drain_events(&self) {
        let mut events = self.events.lock().await;
        loop {
            match events.try_recv() {
                Ok(event) => {
                    self.cache.lock().await.remove(&event.owner_id);
                }
                Err(TryRecvError::Lagged(_)) => {
                    // Missed events; assume everything is stale.
                    self.cache.lock().await.clear();
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }
}
