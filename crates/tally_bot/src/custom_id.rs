//! Component custom ids.
//!
//! The confirmation buttons carry their target user and confirmation token
//! inside the custom id, `CONFIRM||{user_id}||{token}`, so a button press
//! needs no server-side session beyond the pending-token map.

use std::fmt;
use tally_error::{GatewayError, GatewayErrorKind};

/// Custom id of the board's select menu.
pub const SELECT_DEBTOR: &str = "SELECT_DEBTOR";
/// Custom id of the board's reset button.
pub const PAID: &str = "PAID";

const CONFIRM: &str = "CONFIRM";
const CANCEL: &str = "CANCEL";
const SEPARATOR: &str = "||";

/// Every custom id the bot hands out on components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomId {
    /// The board's player select menu
    SelectDebtor,
    /// The board's "I paid!" button
    Paid,
    /// Confirm button of an ephemeral charge prompt
    Confirm {
        /// User the charge applies to
        user_id: String,
        /// Single-use confirmation token
        token: String,
    },
    /// Cancel button of an ephemeral charge prompt
    Cancel {
        /// User the charge would have applied to
        user_id: String,
        /// Single-use confirmation token
        token: String,
    },
}

impl CustomId {
    /// Confirm id for a user and token.
    pub fn confirm(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self::Confirm {
            user_id: user_id.into(),
            token: token.into(),
        }
    }

    /// Cancel id for a user and token.
    pub fn cancel(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self::Cancel {
            user_id: user_id.into(),
            token: token.into(),
        }
    }

    /// Parse a raw custom id.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_bot::CustomId;
    ///
    /// let id = CustomId::parse("CONFIRM||1234||a-token").unwrap();
    /// assert_eq!(id, CustomId::confirm("1234", "a-token"));
    /// ```
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        match raw {
            SELECT_DEBTOR => return Ok(Self::SelectDebtor),
            PAID => return Ok(Self::Paid),
            _ => {}
        }
        let mut segments = raw.splitn(3, SEPARATOR);
        match (segments.next(), segments.next(), segments.next()) {
            (Some(CONFIRM), Some(user_id), Some(token)) => Ok(Self::confirm(user_id, token)),
            (Some(CANCEL), Some(user_id), Some(token)) => Ok(Self::cancel(user_id, token)),
            _ => Err(GatewayError::new(GatewayErrorKind::MalformedId(
                raw.to_string(),
            ))),
        }
    }
}

impl fmt::Display for CustomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectDebtor => f.write_str(SELECT_DEBTOR),
            Self::Paid => f.write_str(PAID),
            Self::Confirm { user_id, token } => {
                write!(f, "{CONFIRM}{SEPARATOR}{user_id}{SEPARATOR}{token}")
            }
            Self::Cancel { user_id, token } => {
                write!(f, "{CANCEL}{SEPARATOR}{user_id}{SEPARATOR}{token}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_ids_round_trip() {
        assert_eq!(CustomId::parse(SELECT_DEBTOR).unwrap(), CustomId::SelectDebtor);
        assert_eq!(CustomId::parse(PAID).unwrap(), CustomId::Paid);
        assert_eq!(CustomId::SelectDebtor.to_string(), "SELECT_DEBTOR");
        assert_eq!(CustomId::Paid.to_string(), "PAID");
    }

    #[test]
    fn confirm_and_cancel_round_trip() {
        for id in [
            CustomId::confirm("263352209654153236", "0190b6a7"),
            CustomId::cancel("263352209654153236", "0190b6a7"),
        ] {
            assert_eq!(CustomId::parse(&id.to_string()).unwrap(), id);
        }
    }

    #[test]
    fn unknown_ids_are_malformed() {
        for raw in ["", "NOPE", "CONFIRM||only-one", "CONFIRM", "||||"] {
            assert!(CustomId::parse(raw).is_err(), "{raw:?} should not parse");
        }
    }
}
