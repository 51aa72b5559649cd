/// Schema migrations
///
/// Migration files are embedded from `tasknest-shared/migrations/` at
/// compile time. Each change is a reversible `<version>_<name>.up.sql` /
/// `.down.sql` pair.

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, error, info, warn};

/// What `_sqlx_migrations` says about the schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub applied: usize,
    pub latest_version: Option<i64>,
    pub pending: usize,
}

impl MigrationStatus {
    pub fn is_up_to_date(&self) -> bool {
        self.pending == 0
    }
}

fn embedded() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Applies every pending migration
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    embedded().run(pool).await.map_err(|e| {
        error!(error = %e, "Migration failed");
        e
    })?;

    info!("Database schema is up to date");
    Ok(())
}

/// Compares applied migrations with the embedded set
pub async fn get_migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await?;

    let known = embedded()
        .iter()
        .filter(|m| m.migration_type.is_up_migration())
        .count();

    if !table_exists {
        debug!("No migrations applied yet");
        return Ok(MigrationStatus {
            applied: 0,
            latest_version: None,
            pending: known,
        });
    }

    let (count, latest_version): (i64, Option<i64>) = sqlx::query_as(
        "SELECT COUNT(*), MAX(version) FROM _sqlx_migrations WHERE success = true",
    )
    .fetch_one(pool)
    .await?;

    let applied = count as usize;
    Ok(MigrationStatus {
        applied,
        latest_version,
        pending: known.saturating_sub(applied),
    })
}

/// Creates the database named in `database_url` if it is missing
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if Postgres::database_exists(database_url).await? {
        debug!("Database already exists");
        return Ok(());
    }

    info!("Database does not exist, creating it");
    Postgres::create_database(database_url).await?;
    info!("Database created");
    Ok(())
}

/// Drops the database named in `database_url`, all data included.
///
/// Meant for test and development databases only.
pub async fn drop_database(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        debug!("Database does not exist, nothing to drop");
        return Ok(());
    }

    warn!("Dropping database");
    Postgres::drop_database(database_url).await?;
    info!("Database dropped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_migrations_are_reversible() {
        let migrator = embedded();
        let ups = migrator
            .iter()
            .filter(|m| m.migration_type.is_up_migration())
            .count();
        let downs = migrator
            .iter()
            .filter(|m| m.migration_type.is_down_migration())
            .count();

        assert_eq!(ups, 4);
        assert_eq!(ups, downs);
    }

    #[test]
    fn test_status_up_to_date() {
        let status = MigrationStatus {
            applied: 4,
            latest_version: Some(20240101000004),
            pending: 0,
        };
        assert!(status.is_up_to_date());
        assert!(!MigrationStatus { pending: 1, ..status }.is_up_to_date());
    }
}
