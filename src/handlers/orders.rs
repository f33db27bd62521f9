use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::{get_current_user, CurrentUser},
    models::{Order, OrderDraft},
    state::AppState,
};

async fn require_user(cookies: Cookies, state: &AppState) -> Result<CurrentUser, AppError> {
    get_current_user(cookies, &state.db)
        .await
        .ok_or(AppError::Unauthorized)
}

pub async fn in_progress_orders(
    cookies: Cookies,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, AppError> {
    let user = require_user(cookies, &state).await?;
    Ok(Json(state.orders.in_progress(user.id).await?))
}

pub async fn completed_orders(
    cookies: Cookies,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, AppError> {
    let user = require_user(cookies, &state).await?;
    Ok(Json(state.orders.completed(user.id).await?))
}

pub async fn all_orders(
    cookies: Cookies,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, AppError> {
    let user = require_user(cookies, &state).await?;
    Ok(Json(state.orders.all(user.id).await?))
}

pub async fn get_order(
    cookies: Cookies,
    Path(order_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Order>, AppError> {
    let user = require_user(cookies, &state).await?;
    Ok(Json(state.orders.get(user.id, order_id).await?))
}

pub async fn create_order(
    cookies: Cookies,
    State(state): State<AppState>,
    Json(draft): Json<OrderDraft>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let user = require_user(cookies, &state).await?;
    let order = state.orders.create(user.id, draft).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update_order(
    cookies: Cookies,
    Path(order_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(draft): Json<OrderDraft>,
) -> Result<Json<Order>, AppError> {
    let user = require_user(cookies, &state).await?;
    Ok(Json(state.orders.update(user.id, order_id, draft).await?))
}

pub async fn complete_order(
    cookies: Cookies,
    Path(order_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Order>, AppError> {
    let user = require_user(cookies, &state).await?;
    Ok(Json(state.orders.mark_completed(user.id, order_id).await?))
}

pub async fn delete_order(
    cookies: Cookies,
    Path(order_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let user = require_user(cookies, &state).await?;
    state.orders.delete(user.id, order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
