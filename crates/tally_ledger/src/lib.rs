//! Debt service for the tally guild-bank bot.
//!
//! The service owns every rule the ledger has: the per-guild roster cap,
//! the one-debt-per-player shape, the `0..=1_000_000` balance bounds, and
//! the journal window with its oldest-first repayment walk. It runs against
//! any [`LedgerStore`](tally_database::LedgerStore), so the same code is
//! exercised by the in-memory store in tests and by PostgreSQL in
//! production.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod journal;
mod service;

pub use journal::{JournalAction, consume_plan};
pub use service::DebtService;
