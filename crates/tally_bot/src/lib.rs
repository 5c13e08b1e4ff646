//! Discord adapter and binary for the tally guild-bank bot.
//!
//! Everything platform-facing lives here: the serenity event handler and
//! client wiring, slash command definitions and execution, the board and
//! journal renderers, and the workflows stitched over the ledger service.
//! The split mirrors the event path:
//!
//! - [`TallyHandler`] translates raw gateway payloads into
//!   [`GatewayEvent`](tally_models::GatewayEvent) values,
//! - [`Dispatcher`] routes them to the registration, confirmation, and
//!   setup workflows,
//! - [`Messenger`] carries every outbound chat call, with
//!   [`SerenityMessenger`] as the production implementation.

#![warn(missing_docs)]

mod commands;
mod config;
mod confirm;
mod custom_id;
mod dispatch;
mod handler;
mod messenger;
mod render;
mod setup;
#[cfg(test)]
pub(crate) mod testing;

pub use commands::CommandRunner;
pub use config::BotConfig;
pub use confirm::{CHARGE_DESCRIPTION, CONFIRM_CHARGE, ConfirmationFlow};
pub use custom_id::CustomId;
pub use dispatch::Dispatcher;
pub use handler::TallyHandler;
pub use messenger::{ConfirmPrompt, Messenger, SerenityMessenger};
pub use render::{BoardRow, BoardView, REGISTRATION_EMOJI, REGISTRATION_PROMPT, SelectChoice};
pub use setup::SetupManager;
