use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;

static POOL: OnceCell<Option<PgPool>> = OnceCell::const_new();

/// Shared connection pool for database tests, created once and reused.
/// `None` when `DATABASE_URL` is not set, so those tests skip themselves.
pub async fn test_pool() -> Option<&'static PgPool> {
    POOL.get_or_init(|| async {
        let database_url = std::env::var("DATABASE_URL").ok()?;

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(std::time::Duration::from_secs(60))
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        // Run migrations once
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Some(pool)
    })
    .await
    .as_ref()
}
