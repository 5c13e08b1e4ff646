//! Database connection utilities.

use crate::StoreResult;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tally_error::{StoreError, StoreErrorKind};
use tracing::info;

/// All migrations, compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Establish a connection to the PostgreSQL database.
///
/// # Errors
///
/// Returns an error if the connection to the database fails.
pub fn establish_connection(database_url: &str) -> StoreResult<PgConnection> {
    PgConnection::establish(database_url)
        .map_err(|e| StoreError::new(StoreErrorKind::Connection(e.to_string())))
}

/// Apply any pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub fn run_migrations(conn: &mut PgConnection) -> StoreResult<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::new(StoreErrorKind::Migration(e.to_string())))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied pending migrations");
    }
    Ok(())
}
