//! Top-level error wrapper types.

use crate::{ConfigError, GatewayError, LedgerError, StoreError};

/// Union of the errors raised anywhere in the tally workspace.
///
/// # Examples
///
/// ```
/// use tally_error::{ConfigError, TallyError};
///
/// let config_err = ConfigError::new("DATABASE_URL is not set");
/// let err: TallyError = config_err.into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TallyErrorKind {
    /// Domain rule violation or missing record reported by the debt service
    #[from(LedgerError)]
    Ledger(LedgerError),
    /// Persistence failure
    #[from(StoreError)]
    Store(StoreError),
    /// Outbound chat platform failure
    #[from(GatewayError)]
    Gateway(GatewayError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Tally error with kind discrimination.
///
/// # Examples
///
/// ```
/// use tally_error::{LedgerError, LedgerErrorKind, TallyResult};
///
/// fn reject_zero(delta: i64) -> TallyResult<i64> {
///     if delta == 0 {
///         Err(LedgerError::new(LedgerErrorKind::ZeroDelta))?
///     }
///     Ok(delta)
/// }
///
/// assert!(reject_zero(0).is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Tally Error: {}", _0)]
pub struct TallyError(Box<TallyErrorKind>);

impl TallyError {
    /// Create a new error from a kind.
    pub fn new(kind: TallyErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TallyErrorKind {
        &self.0
    }

    /// The ledger error inside, when this is one.
    pub fn as_ledger(&self) -> Option<&LedgerError> {
        match self.kind() {
            TallyErrorKind::Ledger(err) => Some(err),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to TallyErrorKind
impl<T> From<T> for TallyError
where
    T: Into<TallyErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

// Lets transaction closures propagate raw diesel errors with `?` (only
// available with the database feature)
#[cfg(feature = "database")]
impl From<diesel::result::Error> for TallyErrorKind {
    fn from(err: diesel::result::Error) -> Self {
        TallyErrorKind::Store(StoreError::from(err))
    }
}

/// Result type for tally operations.
///
/// # Examples
///
/// ```
/// use tally_error::{StoreError, StoreErrorKind, TallyResult};
///
/// fn lookup() -> TallyResult<String> {
///     Err(StoreError::new(StoreErrorKind::NotFound))?
/// }
/// ```
pub type TallyResult<T> = std::result::Result<T, TallyError>;
