use std::sync::Arc;

use crate::database::Database;
use crate::orders::OrderService;
use crate::store::{ClientCounter, OrderStore, PgOrderStore};
use crate::summary::SummaryCache;

/// Shared handler state: the raw pool for the identity seam and the glue
/// CRUD, the order service for everything order-shaped, and the summary
/// cache subscribed to the service's change feed.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub orders: OrderService,
    pub summaries: Arc<SummaryCache>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        let store: Arc<dyn OrderStore> = Arc::new(PgOrderStore::new(db.clone()));
        let clients: Arc<dyn ClientCounter> = Arc::new(db.clone());
        let orders = OrderService::new(store.clone());
        let summaries = Arc::new(SummaryCache::new(store, clients, orders.subscribe()));

        Self {
            db,
            orders,
            summaries,
        }
    }
}
