//! Registered player types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A member registered with the guild bank.
///
/// # Examples
///
/// ```
/// use tally_models::NewPlayer;
///
/// let new = NewPlayer::new("123456789", "torfstack", "987654321", "Torfstack");
/// assert_eq!(new.guild_id, "987654321");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Surrogate id assigned by the store
    pub id: i32,
    /// Platform user id, a decimal-string snowflake
    pub discord_id: String,
    /// Platform account name
    pub discord_name: String,
    /// Guild the player is registered in
    pub guild_id: String,
    /// Display name shown on the board
    pub name: String,
    /// Registration time
    pub created_at: NaiveDateTime,
}

/// Payload for registering a player. The store assigns the id and the
/// registration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct NewPlayer {
    /// Platform user id
    #[new(into)]
    pub discord_id: String,
    /// Platform account name
    #[new(into)]
    pub discord_name: String,
    /// Guild to register in
    #[new(into)]
    pub guild_id: String,
    /// Display name shown on the board
    #[new(into)]
    pub name: String,
}
