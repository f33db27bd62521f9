use axum::{extract::State, Json};
use chrono::Utc;
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    middleware::{get_current_user, CurrentUser},
    state::AppState,
    summary::Summary,
};

/// Profile of the signed-in user, for the dashboard greeting.
pub async fn me(
    cookies: Cookies,
    State(state): State<AppState>,
) -> Result<Json<CurrentUser>, AppError> {
    let user = get_current_user(cookies, &state.db)
        .await
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(user))
}

/// Dashboard counters for the signed-in user. The wall clock is read here
/// at the edge; everything below takes the date as a parameter.
pub async fn summary(
    cookies: Cookies,
    State(state): State<AppState>,
) -> Result<Json<Summary>, AppError> {
    let user = get_current_user(cookies, &state.db)
        .await
        .ok_or(AppError::Unauthorized)?;

    let today = Utc::now().date_naive();
    let summary = state.summaries.get(user.id, today).await?;
    Ok(Json(summary))
}
