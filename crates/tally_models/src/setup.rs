//! Guild setup types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Payload for installing a setup. The store assigns the install time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct NewGuildSetup {
    /// Guild id, a decimal-string snowflake
    #[new(into)]
    pub guild_id: String,
    /// Channel both messages were posted to
    #[new(into)]
    pub channel_id: String,
    /// Message members react to for registration
    #[new(into)]
    pub registration_message_id: String,
    /// Message carrying the debt board embed and its components
    #[new(into)]
    pub board_message_id: String,
}

/// The messages a guild's bank lives in. One row per guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildSetup {
    /// Guild id, a decimal-string snowflake
    pub guild_id: String,
    /// Channel both messages were posted to
    pub channel_id: String,
    /// Message members react to for registration
    pub registration_message_id: String,
    /// Message carrying the debt board embed and its components
    pub board_message_id: String,
    /// Time the setup was installed
    pub created_at: NaiveDateTime,
}
