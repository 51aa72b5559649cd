/// PostgreSQL plumbing: connection pool and schema migrations
///
/// Queries themselves live next to the row types in `models`; the
/// `store::PgStore` adapter wraps both behind the `Store` trait.
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::new(std::env::var("DATABASE_URL")?)).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

pub mod migrations;
pub mod pool;
