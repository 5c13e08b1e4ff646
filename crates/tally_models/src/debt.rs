//! Balance types.

use crate::Player;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The running balance a player owes the guild bank.
///
/// Amounts are in the smallest currency unit and stay inside
/// `0..=`[`MAX_BALANCE`](crate::MAX_BALANCE) at every commit point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    /// Surrogate id assigned by the store
    pub id: i32,
    /// Owning player
    pub player_id: i32,
    /// Current amount owed
    pub amount: i64,
    /// Time of the last balance change
    pub last_updated: NaiveDateTime,
}

/// One roster line: a player together with its balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerBalance {
    /// The registered player
    pub player: Player,
    /// The player's balance
    pub debt: Debt,
}

impl PlayerBalance {
    /// Display name for board rows and menu options.
    pub fn name(&self) -> &str {
        &self.player.name
    }

    /// Current amount owed.
    pub fn amount(&self) -> i64 {
        self.debt.amount
    }
}
