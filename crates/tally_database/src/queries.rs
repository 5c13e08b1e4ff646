//! The persistence surface the debt service runs against.

use tally_error::StoreError;
use tally_models::{Debt, GuildSetup, JournalEntry, NewGuildSetup, NewPlayer, Player, PlayerBalance};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Everything one ledger transaction can do.
///
/// Implementations are synchronous; [`LedgerStore`](crate::LedgerStore) hands
/// a `&mut dyn LedgerQueries` to a closure, either standalone for reads or
/// inside a transaction for writes. All methods speak domain types, never
/// rows.
pub trait LedgerQueries {
    /// Number of registered players in a guild.
    fn player_count(&mut self, guild_id: &str) -> StoreResult<i64>;

    /// Whether the (user, guild) pair is registered.
    fn player_exists(&mut self, discord_id: &str, guild_id: &str) -> StoreResult<bool>;

    /// Insert a player and return it with its assigned id.
    fn insert_player(&mut self, player: &NewPlayer) -> StoreResult<Player>;

    /// Delete a player. Returns the number of rows removed.
    fn delete_player(&mut self, discord_id: &str, guild_id: &str) -> StoreResult<usize>;

    /// Fetch one player by user and guild.
    fn player(&mut self, discord_id: &str, guild_id: &str) -> StoreResult<Option<Player>>;

    /// All players of a guild with their balances, ordered by amount
    /// descending, then case-insensitively by name.
    fn roster(&mut self, guild_id: &str) -> StoreResult<Vec<PlayerBalance>>;

    /// Fetch a player's debt row.
    fn debt(&mut self, player_id: i32) -> StoreResult<Option<Debt>>;

    /// Fetch a player's debt row and lock it for the rest of the
    /// transaction.
    fn debt_for_update(&mut self, player_id: i32) -> StoreResult<Option<Debt>>;

    /// Insert a zero-amount debt row for a freshly registered player.
    fn insert_debt(&mut self, player_id: i32) -> StoreResult<Debt>;

    /// Overwrite a debt amount and stamp the update time.
    fn set_debt_amount(&mut self, player_id: i32, amount: i64) -> StoreResult<()>;

    /// The visible journal window: the newest entries, newest first, at most
    /// [`JOURNAL_WINDOW`](tally_models::JOURNAL_WINDOW) of them.
    fn journal_window(&mut self, player_id: i32) -> StoreResult<Vec<JournalEntry>>;

    /// Append a journal entry.
    fn insert_journal_entry(
        &mut self,
        player_id: i32,
        amount: i64,
        description: &str,
    ) -> StoreResult<JournalEntry>;

    /// Overwrite one entry's remaining amount.
    fn update_journal_amount(&mut self, entry_id: i32, amount: i64) -> StoreResult<()>;

    /// Delete one journal entry.
    fn delete_journal_entry(&mut self, entry_id: i32) -> StoreResult<()>;

    /// Drop everything older than the visible window. Returns the number of
    /// entries removed.
    fn trim_journal(&mut self, player_id: i32) -> StoreResult<usize>;

    /// Fetch a guild's setup row.
    fn setup(&mut self, guild_id: &str) -> StoreResult<Option<GuildSetup>>;

    /// Insert or overwrite a guild's setup row.
    fn put_setup(&mut self, setup: &NewGuildSetup) -> StoreResult<GuildSetup>;

    /// Delete a guild's setup row. Returns the number of rows removed.
    fn delete_setup(&mut self, guild_id: &str) -> StoreResult<usize>;

    /// Every stored setup row, for rebuilding the registration index at
    /// startup.
    fn all_setups(&mut self) -> StoreResult<Vec<GuildSetup>>;
}
