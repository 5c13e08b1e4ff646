//! Domain types for the tally guild-bank bot.
//!
//! Everything here is platform-agnostic: ids are the decimal-string
//! snowflakes the chat platform hands out, timestamps are naive UTC, and no
//! gateway or database type leaks in. The database crate converts these to
//! and from its row types; the bot crate converts gateway payloads into
//! [`GatewayEvent`] values.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod debt;
mod event;
mod journal;
mod limits;
mod player;
mod setup;

pub use debt::{Debt, PlayerBalance};
pub use event::{ComponentEvent, GatewayEvent, InteractionHandle, ReactionEvent, SelectEvent};
pub use journal::JournalEntry;
pub use limits::{JOURNAL_WINDOW, MAX_BALANCE, ROSTER_CAP};
pub use player::{NewPlayer, Player};
pub use setup::{GuildSetup, NewGuildSetup};
