use serde::Serialize;
use sqlx::FromRow;
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::database::Database;

/// The signed-in user as seen by this service: an id to scope every store
/// call with, plus the profile fields the dashboard greets people by.
/// Sessions themselves are created elsewhere; this service only resolves
/// the opaque token it is handed.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CurrentUser {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub business_name: Option<String>,
}

pub async fn get_current_user(cookies: Cookies, db: &Database) -> Option<CurrentUser> {
    let token = cookies.get("session_token")?.value().to_string();

    sqlx::query_as::<_, CurrentUser>(
        r#"
        SELECT p.id, p.full_name, p.business_name
        FROM sessions s
        JOIN profiles p ON p.id = s.user_id
        WHERE s.token = $1 AND s.expires_at > NOW()
        "#,
    )
    .bind(&token)
    .fetch_optional(db)
    .await
    .ok()?
}
