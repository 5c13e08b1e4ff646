//! Ledger error types covering validation, lookup, conflict, and invariant
//! conditions raised by the debt service.

/// Ledger error conditions.
///
/// Variants fall into four groups: rejected input (`ZeroDelta`,
/// `BalanceWouldGoNegative`, `BalanceTooHigh`, `RosterFull`), missing records
/// (`UnknownPlayer`, `MissingDebt`, `MissingSetup`), conflicts
/// (`AlreadyRegistered`), and stored state that breaks the balance bounds
/// (`CorruptBalance`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum LedgerErrorKind {
    /// A delta of zero has no effect and is rejected before any write
    #[display("delta must not be zero")]
    ZeroDelta,
    /// The delta would push the balance below zero
    #[display("debt cannot be negative: {} {:+} falls below 0", current, delta)]
    BalanceWouldGoNegative {
        /// Balance before the rejected delta
        current: i64,
        /// The rejected delta
        delta: i64,
    },
    /// The delta would push the balance above the cap
    #[display("debt cannot be more than 1_000_000: {} {:+} exceeds the cap", current, delta)]
    BalanceTooHigh {
        /// Balance before the rejected delta
        current: i64,
        /// The rejected delta
        delta: i64,
    },
    /// The guild already holds the maximum number of registered players
    #[display("guild {} already has the maximum number of players", _0)]
    RosterFull(String),
    /// The (user, guild) pair is already registered
    #[display("player '{}' is already registered", _0)]
    AlreadyRegistered(String),
    /// No player registered for the given user in the given guild
    #[display("no player registered for user {}", _0)]
    UnknownPlayer(String),
    /// A registered player is missing its debt row
    #[display("player {} has no debt row", _0)]
    MissingDebt(i32),
    /// No setup stored for the guild
    #[display("no setup stored for guild {}", _0)]
    MissingSetup(String),
    /// A stored amount violates the balance bounds
    #[display("stored amount {} lies outside 0..=1_000_000", _0)]
    CorruptBalance(i64),
}

/// Ledger error with source location tracking.
///
/// # Examples
///
/// ```
/// use tally_error::{LedgerError, LedgerErrorKind};
///
/// let err = LedgerError::new(LedgerErrorKind::ZeroDelta);
/// assert!(format!("{}", err).contains("must not be zero"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Ledger Error: {} at line {} in {}", kind, line, file)]
pub struct LedgerError {
    /// The kind of error that occurred
    pub kind: LedgerErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl LedgerError {
    /// Create a new LedgerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: LedgerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// True for conditions a gateway consumer logs and drops rather than
    /// surfaces: duplicate registrations and lookups of players that are
    /// already gone.
    pub fn is_ignorable(&self) -> bool {
        matches!(
            self.kind,
            LedgerErrorKind::AlreadyRegistered(_) | LedgerErrorKind::UnknownPlayer(_)
        )
    }
}
