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
    models::{CreateRecipe, CreateRecipeCategory, Recipe, RecipeCategory},
    state::AppState,
    store::StoreError,
};

pub async fn recipes_list(
    cookies: Cookies,
    State(state): State<AppState>,
) -> Result<Json<Vec<Recipe>>, AppError> {
    let user = get_current_user(cookies, &state.db)
        .await
        .ok_or(AppError::Unauthorized)?;

    let recipes = sqlx::query_as::<_, Recipe>(
        "SELECT * FROM recipes WHERE owner_id = $1 ORDER BY title",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await
    .map_err(StoreError::from)?;

    Ok(Json(recipes))
}

pub async fn create_recipe(
    cookies: Cookies,
    State(state): State<AppState>,
    Json(form): Json<CreateRecipe>,
) -> Result<(StatusCode, Json<Recipe>), AppError> {
    let user = get_current_user(cookies, &state.db)
        .await
        .ok_or(AppError::Unauthorized)?;

    if form.title.trim().is_empty() {
        return Err(AppError::Validation("recipe title must not be empty".into()));
    }
    if form.instructions.trim().is_empty() {
        return Err(AppError::Validation(
            "recipe instructions must not be empty".into(),
        ));
    }

    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        INSERT INTO recipes (owner_id, title, category_id, description, instructions)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(form.title.trim())
    .bind(form.category_id)
    .bind(&form.description)
    .bind(&form.instructions)
    .fetch_one(&state.db)
    .await
    .map_err(StoreError::from)?;

    Ok((StatusCode::CREATED, Json(recipe)))
}

pub async fn delete_recipe(
    cookies: Cookies,
    Path(recipe_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let user = get_current_user(cookies, &state.db)
        .await
        .ok_or(AppError::Unauthorized)?;

    let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND owner_id = $2")
        .bind(recipe_id)
        .bind(user.id)
        .execute(&state.db)
        .await
        .map_err(StoreError::from)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn categories_list(
    cookies: Cookies,
    State(state): State<AppState>,
) -> Result<Json<Vec<RecipeCategory>>, AppError> {
    let user = get_current_user(cookies, &state.db)
        .await
        .ok_or(AppError::Unauthorized)?;

    let categories = sqlx::query_as::<_, RecipeCategory>(
        "SELECT * FROM recipe_categories WHERE owner_id = $1 ORDER BY name",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await
    .map_err(StoreError::from)?;

    Ok(Json(categories))
}

pub async fn create_category(
    cookies: Cookies,
    State(state): State<AppState>,
    Json(form): Json<CreateRecipeCategory>,
) -> Result<(StatusCode, Json<RecipeCategory>), AppError> {
    let user = get_current_user(cookies, &state.db)
        .await
        .ok_or(AppError::Unauthorized)?;

    if form.name.trim().is_empty() {
        return Err(AppError::Validation("category name must not be empty".into()));
    }

    let category = sqlx::query_as::<_, RecipeCategory>(
        "INSERT INTO recipe_categories (owner_id, name) VALUES ($1, $2) RETURNING *",
    )
    .bind(user.id)
    .bind(form.name.trim())
    .fetch_one(&state.db)
    .await
    .map_err(StoreError::from)?;

    Ok((StatusCode::CREATED, Json(category)))
}
