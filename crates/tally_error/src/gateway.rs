//! Chat gateway error types.

/// Gateway error conditions raised by outbound chat operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GatewayErrorKind {
    /// The operation did not complete within its deadline
    #[display("Gateway timeout during {}", _0)]
    Timeout(String),
    /// The platform rejected or failed the request
    #[display("Gateway request failed: {}", _0)]
    Request(String),
    /// A message or channel id did not parse as a snowflake
    #[display("Malformed id: {}", _0)]
    MalformedId(String),
}

/// Gateway error with source location tracking.
///
/// # Examples
///
/// ```
/// use tally_error::{GatewayError, GatewayErrorKind};
///
/// let err = GatewayError::new(GatewayErrorKind::Timeout("delete message".into()));
/// assert!(format!("{}", err).contains("timeout"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Gateway Error: {} at line {} in {}", kind, line, file)]
pub struct GatewayError {
    /// The kind of error that occurred
    pub kind: GatewayErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GatewayError {
    /// Create a new GatewayError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GatewayErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
