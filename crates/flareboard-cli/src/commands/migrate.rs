//! Database migration command.

use flareboard_core::config::AppConfig;
use flareboard_core::error::AppError;
use flareboard_database::connection::DatabasePool;
use flareboard_database::migration::run_migrations;

use crate::output;

/// Connect with the configured pool and apply pending migrations.
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    run_migrations(pool.pool()).await?;
    pool.close().await;
    output::print_success("Migrations applied");
    Ok(())
}
