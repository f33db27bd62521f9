use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub type Database = Pool<Postgres>;

pub async fn create_database_pool(database_url: &str) -> Result<Database, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    // Fail fast on a pool that cannot actually reach the server
    sqlx::query("SELECT 1").fetch_one(&pool).await?;

    log::info!("database connection established");
    Ok(pool)
}
