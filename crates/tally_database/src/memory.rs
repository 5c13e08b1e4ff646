//! In-memory ledger store for tests and local runs.

use crate::{LedgerQueries, LedgerStore, StoreResult};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use tally_error::{StoreError, StoreErrorKind, TallyResult};
use tally_models::{
    Debt, GuildSetup, JOURNAL_WINDOW, JournalEntry, NewGuildSetup, NewPlayer, Player, PlayerBalance,
};
use tokio::sync::Mutex;

/// A [`LedgerStore`] over plain maps.
///
/// Transactions get the same commit-or-rollback behavior as the PostgreSQL
/// store: the closure runs against a copy of the state, and the copy only
/// replaces the original when the closure returns `Ok`.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    state: Mutex<MemoryState>,
}

impl MemoryLedgerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn read<R, F>(&self, f: F) -> TallyResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn LedgerQueries) -> TallyResult<R> + Send + 'static,
    {
        let mut state = self.state.lock().await;
        f(&mut *state)
    }

    async fn transaction<R, F>(&self, f: F) -> TallyResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn LedgerQueries) -> TallyResult<R> + Send + 'static,
    {
        let mut state = self.state.lock().await;
        let mut scratch = state.clone();
        let result = f(&mut scratch)?;
        *state = scratch;
        Ok(result)
    }
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    players: Vec<Player>,
    debts: Vec<Debt>,
    journal: Vec<JournalEntry>,
    setups: Vec<GuildSetup>,
    next_player_id: i32,
    next_debt_id: i32,
    next_entry_id: i32,
}

fn timestamp() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

impl MemoryState {
    /// Ids of the visible window, newest first.
    fn window_ids(&self, player_id: i32) -> Vec<i32> {
        let mut entries: Vec<&JournalEntry> = self
            .journal
            .iter()
            .filter(|entry| entry.player_id == player_id)
            .collect();
        entries.sort_by(|a, b| {
            b.recorded_at
                .cmp(&a.recorded_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        entries.iter().map(|entry| entry.id).collect()
    }
}

impl LedgerQueries for MemoryState {
    fn player_count(&mut self, guild_id: &str) -> StoreResult<i64> {
        Ok(self
            .players
            .iter()
            .filter(|player| player.guild_id == guild_id)
            .count() as i64)
    }

    fn player_exists(&mut self, discord_id: &str, guild_id: &str) -> StoreResult<bool> {
        Ok(self
            .players
            .iter()
            .any(|player| player.discord_id == discord_id && player.guild_id == guild_id))
    }

    fn insert_player(&mut self, player: &NewPlayer) -> StoreResult<Player> {
        if self.player_exists(&player.discord_id, &player.guild_id)? {
            return Err(StoreError::new(StoreErrorKind::Query(
                "unique violation on players".to_string(),
            )));
        }
        self.next_player_id += 1;
        let stored = Player {
            id: self.next_player_id,
            discord_id: player.discord_id.clone(),
            discord_name: player.discord_name.clone(),
            guild_id: player.guild_id.clone(),
            name: player.name.clone(),
            created_at: timestamp(),
        };
        self.players.push(stored.clone());
        Ok(stored)
    }

    fn delete_player(&mut self, discord_id: &str, guild_id: &str) -> StoreResult<usize> {
        let before = self.players.len();
        self.players
            .retain(|player| !(player.discord_id == discord_id && player.guild_id == guild_id));
        Ok(before - self.players.len())
    }

    fn player(&mut self, discord_id: &str, guild_id: &str) -> StoreResult<Option<Player>> {
        Ok(self
            .players
            .iter()
            .find(|player| player.discord_id == discord_id && player.guild_id == guild_id)
            .cloned())
    }

    fn roster(&mut self, guild_id: &str) -> StoreResult<Vec<PlayerBalance>> {
        let mut rows: Vec<PlayerBalance> = self
            .players
            .iter()
            .filter(|player| player.guild_id == guild_id)
            .filter_map(|player| {
                self.debts
                    .iter()
                    .find(|debt| debt.player_id == player.id)
                    .map(|debt| PlayerBalance {
                        player: player.clone(),
                        debt: debt.clone(),
                    })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.amount()
                .cmp(&a.amount())
                .then_with(|| a.name().to_uppercase().cmp(&b.name().to_uppercase()))
        });
        Ok(rows)
    }

    fn debt(&mut self, player_id: i32) -> StoreResult<Option<Debt>> {
        Ok(self
            .debts
            .iter()
            .find(|debt| debt.player_id == player_id)
            .cloned())
    }

    fn debt_for_update(&mut self, player_id: i32) -> StoreResult<Option<Debt>> {
        // The state lock already serializes writers.
        self.debt(player_id)
    }

    fn insert_debt(&mut self, player_id: i32) -> StoreResult<Debt> {
        self.next_debt_id += 1;
        let stored = Debt {
            id: self.next_debt_id,
            player_id,
            amount: 0,
            last_updated: timestamp(),
        };
        self.debts.push(stored.clone());
        Ok(stored)
    }

    fn set_debt_amount(&mut self, player_id: i32, amount: i64) -> StoreResult<()> {
        let debt = self
            .debts
            .iter_mut()
            .find(|debt| debt.player_id == player_id)
            .ok_or_else(|| StoreError::new(StoreErrorKind::NotFound))?;
        debt.amount = amount;
        debt.last_updated = timestamp();
        Ok(())
    }

    fn journal_window(&mut self, player_id: i32) -> StoreResult<Vec<JournalEntry>> {
        let window: Vec<JournalEntry> = self
            .window_ids(player_id)
            .into_iter()
            .take(JOURNAL_WINDOW as usize)
            .filter_map(|id| self.journal.iter().find(|entry| entry.id == id).cloned())
            .collect();
        Ok(window)
    }

    fn insert_journal_entry(
        &mut self,
        player_id: i32,
        amount: i64,
        description: &str,
    ) -> StoreResult<JournalEntry> {
        self.next_entry_id += 1;
        let stored = JournalEntry {
            id: self.next_entry_id,
            player_id,
            amount,
            description: description.to_string(),
            recorded_at: timestamp(),
        };
        self.journal.push(stored.clone());
        Ok(stored)
    }

    fn update_journal_amount(&mut self, entry_id: i32, amount: i64) -> StoreResult<()> {
        let entry = self
            .journal
            .iter_mut()
            .find(|entry| entry.id == entry_id)
            .ok_or_else(|| StoreError::new(StoreErrorKind::NotFound))?;
        entry.amount = amount;
        Ok(())
    }

    fn delete_journal_entry(&mut self, entry_id: i32) -> StoreResult<()> {
        let before = self.journal.len();
        self.journal.retain(|entry| entry.id != entry_id);
        if before == self.journal.len() {
            return Err(StoreError::new(StoreErrorKind::NotFound));
        }
        Ok(())
    }

    fn trim_journal(&mut self, player_id: i32) -> StoreResult<usize> {
        let keep: Vec<i32> = self
            .window_ids(player_id)
            .into_iter()
            .take(JOURNAL_WINDOW as usize)
            .collect();
        let before = self.journal.len();
        self.journal
            .retain(|entry| entry.player_id != player_id || keep.contains(&entry.id));
        Ok(before - self.journal.len())
    }

    fn setup(&mut self, guild_id: &str) -> StoreResult<Option<GuildSetup>> {
        Ok(self
            .setups
            .iter()
            .find(|setup| setup.guild_id == guild_id)
            .cloned())
    }

    fn put_setup(&mut self, setup: &NewGuildSetup) -> StoreResult<GuildSetup> {
        let stored = GuildSetup {
            guild_id: setup.guild_id.clone(),
            channel_id: setup.channel_id.clone(),
            registration_message_id: setup.registration_message_id.clone(),
            board_message_id: setup.board_message_id.clone(),
            created_at: timestamp(),
        };
        self.setups.retain(|row| row.guild_id != setup.guild_id);
        self.setups.push(stored.clone());
        Ok(stored)
    }

    fn delete_setup(&mut self, guild_id: &str) -> StoreResult<usize> {
        let before = self.setups.len();
        self.setups.retain(|setup| setup.guild_id != guild_id);
        Ok(before - self.setups.len())
    }

    fn all_setups(&mut self) -> StoreResult<Vec<GuildSetup>> {
        Ok(self.setups.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_player(n: u32) -> NewPlayer {
        NewPlayer::new(
            format!("user-{n}"),
            format!("account-{n}"),
            "guild-1",
            format!("Player {n}"),
        )
    }

    #[tokio::test]
    async fn transaction_commits_on_ok() {
        let store = MemoryLedgerStore::new();
        store
            .transaction(|queries| {
                let player = queries.insert_player(&sample_player(1))?;
                queries.insert_debt(player.id)?;
                Ok(())
            })
            .await
            .unwrap();

        let count = store
            .read(|queries| Ok(queries.player_count("guild-1")?))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn transaction_rolls_back_on_err() {
        let store = MemoryLedgerStore::new();
        let result: TallyResult<()> = store
            .transaction(|queries| {
                queries.insert_player(&sample_player(1))?;
                Err(StoreError::new(StoreErrorKind::Query("boom".into())).into())
            })
            .await;
        assert!(result.is_err());

        let count = store
            .read(|queries| Ok(queries.player_count("guild-1")?))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn journal_window_is_newest_first_and_capped() {
        let store = MemoryLedgerStore::new();
        let window = store
            .transaction(|queries| {
                let player = queries.insert_player(&sample_player(1))?;
                queries.insert_debt(player.id)?;
                for n in 0..15 {
                    queries.insert_journal_entry(player.id, 1_000 + n, "raid")?;
                }
                queries.trim_journal(player.id)?;
                Ok(queries.journal_window(player.id)?)
            })
            .await
            .unwrap();

        assert_eq!(window.len(), JOURNAL_WINDOW as usize);
        assert_eq!(window.first().map(|entry| entry.amount), Some(1_014));
        assert_eq!(window.last().map(|entry| entry.amount), Some(1_005));
    }

    #[tokio::test]
    async fn trim_drops_oldest_entries() {
        let store = MemoryLedgerStore::new();
        let removed = store
            .transaction(|queries| {
                let player = queries.insert_player(&sample_player(1))?;
                for _ in 0..12 {
                    queries.insert_journal_entry(player.id, 500, "boss reset")?;
                }
                Ok(queries.trim_journal(player.id)?)
            })
            .await
            .unwrap();
        assert_eq!(removed, 2);
    }

    #[tokio::test]
    async fn roster_orders_by_amount_then_name() {
        let store = MemoryLedgerStore::new();
        let roster = store
            .transaction(|queries| {
                for (n, name, amount) in [(1, "zoe", 500), (2, "Anna", 500), (3, "mia", 9_000)] {
                    let player = queries.insert_player(&NewPlayer::new(
                        format!("user-{n}"),
                        format!("account-{n}"),
                        "guild-1",
                        name,
                    ))?;
                    queries.insert_debt(player.id)?;
                    queries.set_debt_amount(player.id, amount)?;
                }
                Ok(queries.roster("guild-1")?)
            })
            .await
            .unwrap();

        let names: Vec<&str> = roster.iter().map(|row| row.name()).collect();
        assert_eq!(names, vec!["mia", "Anna", "zoe"]);
    }

    #[tokio::test]
    async fn put_setup_overwrites_existing_row() {
        let store = MemoryLedgerStore::new();
        let setups = store
            .transaction(|queries| {
                queries.put_setup(&NewGuildSetup::new("guild-1", "chan-1", "reg-1", "board-1"))?;
                queries.put_setup(&NewGuildSetup::new("guild-1", "chan-2", "reg-2", "board-2"))?;
                Ok(queries.all_setups()?)
            })
            .await
            .unwrap();

        assert_eq!(setups.len(), 1);
        assert_eq!(setups[0].channel_id, "chan-2");
    }
}
