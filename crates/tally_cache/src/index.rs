//! Registration-message index.

use parking_lot::RwLock;
use std::collections::HashSet;

/// The set of registration message ids across all guilds.
///
/// Reaction events check against this set before touching the database, so
/// reactions on unrelated messages cost nothing. The set is hydrated from
/// the stored setups at startup and kept current by the setup lifecycle.
///
/// # Example
///
/// ```
/// use tally_cache::RegistrationIndex;
///
/// let index = RegistrationIndex::new();
/// index.insert("111");
/// assert!(index.is_registration_message("111"));
/// assert!(!index.is_registration_message("222"));
/// ```
#[derive(Debug, Default)]
pub struct RegistrationIndex {
    messages: RwLock<HashSet<String>>,
}

impl RegistrationIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the index from stored message ids. Returns the number held
    /// afterwards.
    pub fn hydrate(&self, message_ids: impl IntoIterator<Item = String>) -> usize {
        let mut messages = self.messages.write();
        messages.extend(message_ids);
        messages.len()
    }

    /// Record a registration message.
    pub fn insert(&self, message_id: impl Into<String>) {
        self.messages.write().insert(message_id.into());
    }

    /// Forget a registration message, after its guild's setup was torn down.
    pub fn remove(&self, message_id: &str) {
        self.messages.write().remove(message_id);
    }

    /// Whether the message is some guild's registration message.
    pub fn is_registration_message(&self, message_id: &str) -> bool {
        self.messages.read().contains(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hydrate_loads_all_ids() {
        let index = RegistrationIndex::new();
        let held = index.hydrate(vec!["1".to_string(), "2".to_string()]);

        assert_eq!(held, 2);
        assert!(index.is_registration_message("1"));
        assert!(index.is_registration_message("2"));
    }

    #[test]
    fn remove_forgets_an_id() {
        let index = RegistrationIndex::new();
        index.insert("1");
        index.remove("1");

        assert!(!index.is_registration_message("1"));
    }
}
