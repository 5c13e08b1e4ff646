//! Domain bounds enforced by the debt service.

/// Upper bound on a balance, in the smallest currency unit.
pub const MAX_BALANCE: i64 = 1_000_000;

/// Maximum number of registered players per guild.
pub const ROSTER_CAP: i64 = 100;

/// Number of journal entries kept visible per player.
pub const JOURNAL_WINDOW: i64 = 10;
