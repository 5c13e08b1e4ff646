//! Pending confirmation tokens with TTL-based expiration.

use derive_getters::Getters;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// One pending confirmation: the ephemeral prompt's interaction token,
/// stamped with its creation time.
#[derive(Debug, Clone, Getters)]
pub struct PendingEntry {
    interaction_token: String,
    created_at: Instant,
    ttl: Duration,
}

impl PendingEntry {
    /// Check if this entry is expired.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }

    /// Get remaining time until expiration.
    pub fn time_remaining(&self) -> Option<Duration> {
        self.ttl.checked_sub(self.created_at.elapsed())
    }
}

/// Configuration for the confirmation map.
#[derive(
    Debug, Clone, Serialize, Deserialize, Getters, derive_setters::Setters, derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct ConfirmationCacheConfig {
    /// TTL for pending confirmations (seconds)
    #[serde(default = "default_ttl")]
    ttl_seconds: u64,
}

fn default_ttl() -> u64 {
    900 // the lifetime of a Discord interaction token
}

impl Default for ConfirmationCacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
        }
    }
}

/// Map of confirmation tokens handed out by the select step.
///
/// Entries are single use: [`take`](Self::take) removes what it returns.
/// Expired entries answer as if they were never stored and get dropped
/// either on access or by the periodic [`sweep`](Self::sweep).
///
/// # Example
///
/// ```
/// use tally_cache::{ConfirmationCacheConfig, PendingConfirmations};
///
/// let pending = PendingConfirmations::new(ConfirmationCacheConfig::default());
/// pending.insert("a-token", "an-interaction-token");
///
/// assert_eq!(pending.take("a-token").as_deref(), Some("an-interaction-token"));
/// assert_eq!(pending.take("a-token"), None);
/// ```
#[derive(Debug)]
pub struct PendingConfirmations {
    config: ConfirmationCacheConfig,
    entries: Mutex<HashMap<String, PendingEntry>>,
}

impl PendingConfirmations {
    /// Create an empty map with the given configuration.
    pub fn new(config: ConfirmationCacheConfig) -> Self {
        tracing::debug!(ttl_seconds = config.ttl_seconds, "Creating confirmation map");
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store a freshly minted token with the prompt's interaction token.
    #[tracing::instrument(skip(self, token, interaction_token))]
    pub fn insert(&self, token: impl Into<String>, interaction_token: impl Into<String>) {
        let entry = PendingEntry {
            interaction_token: interaction_token.into(),
            created_at: Instant::now(),
            ttl: Duration::from_secs(self.config.ttl_seconds),
        };
        self.entries.lock().insert(token.into(), entry);
    }

    /// Consume a token.
    ///
    /// Returns the stored interaction token when the entry exists and is
    /// unexpired; in every case the entry is gone afterwards.
    #[tracing::instrument(skip(self, token))]
    pub fn take(&self, token: &str) -> Option<String> {
        let entry = self.entries.lock().remove(token)?;
        if entry.is_expired() {
            tracing::debug!("Confirmation token expired, dropping");
            return None;
        }
        Some(entry.interaction_token)
    }

    /// Drop every expired entry. Returns the number removed.
    pub fn sweep(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(removed, "Swept expired confirmation tokens");
        }
        removed
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_ttl(ttl_seconds: u64) -> PendingConfirmations {
        let config = ConfirmationCacheConfig::default().with_ttl_seconds(ttl_seconds);
        PendingConfirmations::new(config)
    }

    #[test]
    fn take_is_single_use() {
        let pending = with_ttl(900);
        pending.insert("token-1", "interaction-1");

        assert_eq!(pending.take("token-1").as_deref(), Some("interaction-1"));
        assert_eq!(pending.take("token-1"), None);
    }

    #[test]
    fn unknown_token_is_none() {
        let pending = with_ttl(900);
        assert_eq!(pending.take("nope"), None);
    }

    #[test]
    fn expired_token_is_none_and_dropped() {
        let pending = with_ttl(0);
        pending.insert("token-1", "interaction-1");
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(pending.take("token-1"), None);
        assert!(pending.is_empty());
    }

    #[test]
    fn sweep_drops_only_expired_entries() {
        let pending = with_ttl(0);
        pending.insert("old", "interaction-old");
        std::thread::sleep(Duration::from_millis(5));

        let fresh = with_ttl(900);
        fresh.insert("new", "interaction-new");

        assert_eq!(pending.sweep(), 1);
        assert_eq!(fresh.sweep(), 0);
        assert!(pending.is_empty());
        assert_eq!(fresh.len(), 1);
    }
}
