//! PostgreSQL persistence for the tally guild-bank bot.
//!
//! This crate owns the schema, the embedded migrations, and the two
//! collaborator seams the debt service runs against:
//!
//! - [`LedgerQueries`], the synchronous per-transaction query surface
//! - [`LedgerStore`], the async entry points with commit-or-rollback
//!   semantics
//!
//! Two stores implement the seam: [`PgLedgerStore`] over diesel and
//! [`MemoryLedgerStore`] for tests and local runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use tally_database::{PgLedgerStore, establish_connection, run_migrations};
//!
//! let mut conn = establish_connection("postgres://localhost/tally")?;
//! run_migrations(&mut conn)?;
//! let store = PgLedgerStore::new(conn);
//! ```

#![forbid(unsafe_code)]

mod connection;
mod memory;
mod models;
mod queries;
mod store;

// Public module for external access
pub mod schema;

// Re-export connection utilities
pub use connection::{MIGRATIONS, establish_connection, run_migrations};

// Re-export the store seam and its implementations
pub use memory::MemoryLedgerStore;
pub use queries::{LedgerQueries, StoreResult};
pub use store::{LedgerStore, PgLedgerStore};

// Re-export row types
pub use models::{
    DebtRow, GuildSetupRow, JournalEntryRow, NewDebtRow, NewGuildSetupRow, NewJournalEntryRow,
    NewPlayerRow, PlayerRow,
};
