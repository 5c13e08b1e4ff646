//! In-memory state for the tally bot.
//!
//! This crate provides the two shared maps the gateway workflows lean on:
//! single-use confirmation tokens with TTL expiration, and the index of
//! registration message ids consulted on every reaction event.

#![warn(missing_docs)]

mod index;
mod pending;

pub use index::RegistrationIndex;
pub use pending::{
    ConfirmationCacheConfig, ConfirmationCacheConfigBuilder, PendingConfirmations, PendingEntry,
};
