use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::get_current_user,
    models::{Client, CreateClient},
    state::AppState,
    store::StoreError,
};

pub async fn clients_list(
    cookies: Cookies,
    State(state): State<AppState>,
) -> Result<Json<Vec<Client>>, AppError> {
    let user = get_current_user(cookies, &state.db)
        .await
        .ok_or(AppError::Unauthorized)?;

    let clients = sqlx::query_as::<_, Client>(
        "SELECT * FROM clients WHERE owner_id = $1 ORDER BY name",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await
    .map_err(StoreError::from)?;

    Ok(Json(clients))
}

pub async fn create_client(
    cookies: Cookies,
    State(state): State<AppState>,
    Json(form): Json<CreateClient>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    let user = get_current_user(cookies, &state.db)
        .await
        .ok_or(AppError::Unauthorized)?;

    if form.name.trim().is_empty() {
        return Err(AppError::Validation("client name must not be empty".into()));
    }

    let client = sqlx::query_as::<_, Client>(
        r#"
        INSERT INTO clients (owner_id, name, phone, email, notes)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(form.name.trim())
    .bind(&form.phone)
    .bind(&form.email)
    .bind(&form.notes)
    .fetch_one(&state.db)
    .await
    .map_err(StoreError::from)?;

    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn delete_client(
    cookies: Cookies,
    Path(client_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let user = get_current_user(cookies, &state.db)
        .await
        .ok_or(AppError::Unauthorized)?;

    let result = sqlx::query("DELETE FROM clients WHERE id = $1 AND owner_id = $2")
        .bind(client_id)
        .bind(user.id)
        .execute(&state.db)
        .await
        .map_err(StoreError::from)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
