//! Error types for the tally workspace.
//!
//! This crate provides the foundation error types used throughout the tally
//! ecosystem.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error
//! handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use tally_error::{GatewayError, GatewayErrorKind, TallyResult};
//!
//! fn post_board() -> TallyResult<String> {
//!     Err(GatewayError::new(GatewayErrorKind::Timeout("edit board".into())))?
//! }
//!
//! match post_board() {
//!     Ok(id) => println!("posted: {}", id),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod gateway;
mod ledger;
mod store;

pub use config::ConfigError;
pub use error::{TallyError, TallyErrorKind, TallyResult};
pub use gateway::{GatewayError, GatewayErrorKind};
pub use ledger::{LedgerError, LedgerErrorKind};
pub use store::{StoreError, StoreErrorKind};
