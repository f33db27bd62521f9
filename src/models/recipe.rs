use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub instructions: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct RecipeCategory {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecipe {
    pub title: String,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub instructions: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecipeCategory {
    pub name: String,
}
