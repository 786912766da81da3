use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Single-instance service with short queries; a small pool and a tight
/// acquire timeout keep slow connections from piling up.
pub async fn create_pool(database_url: &str, max_connections: u32) -> PgPool {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(std::time::Duration::from_secs(3))
        .connect(database_url)
        .await
        .expect("Failed to create database pool")
}
