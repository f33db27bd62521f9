use axum::{
    routing::{delete, get, post, put},
    Router,
};
use dotenvy::dotenv;
use std::env;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use bakehouse::database::create_database_pool;
use bakehouse::handlers;
use bakehouse::state::AppState;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let db = create_database_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    let app = create_router(AppState::new(db));

    // Get port from environment or use default
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);

    log::info!("bakehouse server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))

        // Dashboard
        .route("/api/me", get(handlers::dashboard::me))
        .route("/api/dashboard/summary", get(handlers::dashboard::summary))

        // Orders: the three views, then the lifecycle operations
        .route("/api/orders/in-progress", get(handlers::orders::in_progress_orders))
        .route("/api/orders/completed", get(handlers::orders::completed_orders))
        .route("/api/orders/all", get(handlers::orders::all_orders))
        .route("/api/orders", post(handlers::orders::create_order))
        .route("/api/orders/:id", get(handlers::orders::get_order))
        .route("/api/orders/:id", put(handlers::orders::update_order))
        .route("/api/orders/:id/complete", post(handlers::orders::complete_order))
        .route("/api/orders/:id", delete(handlers::orders::delete_order))

        // Clients
        .route("/api/clients", get(handlers::clients::clients_list))
        .route("/api/clients", post(handlers::clients::create_client))
        .route("/api/clients/:id", delete(handlers::clients::delete_client))

        // Recipes
        .route("/api/recipes", get(handlers::recipes::recipes_list))
        .route("/api/recipes", post(handlers::recipes::create_recipe))
        .route("/api/recipes/:id", delete(handlers::recipes::delete_recipe))
        .route("/api/recipe-categories", get(handlers::recipes::categories_list))
        .route("/api/recipe-categories", post(handlers::recipes::create_category))

        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
