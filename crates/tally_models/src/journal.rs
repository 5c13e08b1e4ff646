//! Journal entry types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One remembered credit, or what is left of it after repayments.
///
/// The amount is always positive. Debits shrink or delete the oldest
/// entries first; only the newest ten entries per player stay visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Surrogate id assigned by the store
    pub id: i32,
    /// Owning player
    pub player_id: i32,
    /// Not-yet-repaid remainder of the credit
    pub amount: i64,
    /// Caller-supplied reason for the credit
    pub description: String,
    /// Time the credit was applied
    pub recorded_at: NaiveDateTime,
}
