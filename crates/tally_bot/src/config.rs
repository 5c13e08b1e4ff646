//! Bot configuration from the environment.

use derive_getters::Getters;
use tally_error::ConfigError;

/// Everything the binary needs to come up.
///
/// # Examples
///
/// ```
/// use tally_bot::BotConfig;
///
/// let config = BotConfig::new("token", "postgres://localhost/tally", "263352209654153236");
/// assert_eq!(config.admin_user_id(), "263352209654153236");
/// ```
#[derive(Debug, Clone, Getters)]
pub struct BotConfig {
    /// Bot token from the Discord developer portal
    discord_token: String,
    /// PostgreSQL connection string
    database_url: String,
    /// User id allowed to run the admin commands
    admin_user_id: String,
}

impl BotConfig {
    /// Read the configuration from `DISCORD_TOKEN`, `DATABASE_URL`, and
    /// `TALLY_ADMIN_ID`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let discord_token = std::env::var("DISCORD_TOKEN")
            .map_err(|_| ConfigError::new("DISCORD_TOKEN environment variable not set"))?;
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::new("DATABASE_URL environment variable not set"))?;
        let admin_user_id = std::env::var("TALLY_ADMIN_ID")
            .map_err(|_| ConfigError::new("TALLY_ADMIN_ID environment variable not set"))?;
        Ok(Self {
            discord_token,
            database_url,
            admin_user_id,
        })
    }

    /// Build a configuration from explicit values.
    pub fn new(
        discord_token: impl Into<String>,
        database_url: impl Into<String>,
        admin_user_id: impl Into<String>,
    ) -> Self {
        Self {
            discord_token: discord_token.into(),
            database_url: database_url.into(),
            admin_user_id: admin_user_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The only test that touches the process environment; everything else
    // builds configs with `new`.
    #[test]
    fn from_env_reads_all_three_variables() {
        unsafe {
            std::env::set_var("DISCORD_TOKEN", "token");
            std::env::set_var("DATABASE_URL", "postgres://localhost/tally");
            std::env::set_var("TALLY_ADMIN_ID", "1");
        }
        let config = BotConfig::from_env().unwrap();
        assert_eq!(config.discord_token(), "token");
        assert_eq!(config.database_url(), "postgres://localhost/tally");
        assert_eq!(config.admin_user_id(), "1");

        unsafe {
            std::env::remove_var("TALLY_ADMIN_ID");
        }
        let err = BotConfig::from_env().unwrap_err();
        assert!(err.message.contains("TALLY_ADMIN_ID"));
    }
}
