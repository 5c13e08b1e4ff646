//! The async store seam and its PostgreSQL implementation.

use crate::models::{
    DebtRow, GuildSetupRow, JournalEntryRow, NewGuildSetupRow, NewJournalEntryRow, NewPlayerRow,
    PlayerRow,
};
use crate::schema::{debt_journal, debts, guild_setups, players};
use crate::{LedgerQueries, StoreResult};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use std::sync::Arc;
use tally_error::{StoreError, StoreErrorKind, TallyResult};
use tally_models::{
    Debt, GuildSetup, JOURNAL_WINDOW, JournalEntry, NewGuildSetup, NewPlayer, Player, PlayerBalance,
};
use tokio::sync::Mutex;
use tracing::instrument;

diesel::define_sql_function! {
    /// SQL `upper()`, used for case-insensitive ordering.
    fn upper(x: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// Async entry points into the ledger's persistence.
///
/// Both methods hand a [`LedgerQueries`] view to the given closure. `read`
/// runs it directly; `transaction` wraps it in a database transaction that
/// commits on `Ok` and rolls everything back on `Err`. Closures return
/// [`TallyResult`] so domain rejections raised mid-transaction abort it the
/// same way query failures do.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Run read-only queries outside a transaction.
    async fn read<R, F>(&self, f: F) -> TallyResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn LedgerQueries) -> TallyResult<R> + Send + 'static;

    /// Run queries inside one transaction with commit-or-rollback semantics.
    async fn transaction<R, F>(&self, f: F) -> TallyResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn LedgerQueries) -> TallyResult<R> + Send + 'static;
}

/// PostgreSQL-backed ledger store.
pub struct PgLedgerStore {
    /// Database connection wrapped in Arc<Mutex> for async safety.
    ///
    /// Note: This is a simple implementation. For production use with high
    /// concurrency, consider using a connection pool like r2d2 or deadpool.
    conn: Arc<Mutex<PgConnection>>,
}

impl PgLedgerStore {
    /// Create a store from an established connection.
    pub fn new(conn: PgConnection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Create a store from a shared connection.
    pub fn from_arc(conn: Arc<Mutex<PgConnection>>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    #[instrument(skip(self, f))]
    async fn read<R, F>(&self, f: F) -> TallyResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn LedgerQueries) -> TallyResult<R> + Send + 'static,
    {
        let mut conn = self.conn.lock().await;
        let mut queries = PgQueries { conn: &mut *conn };
        f(&mut queries)
    }

    #[instrument(skip(self, f))]
    async fn transaction<R, F>(&self, f: F) -> TallyResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn LedgerQueries) -> TallyResult<R> + Send + 'static,
    {
        let mut conn = self.conn.lock().await;
        conn.transaction(|conn| {
            let mut queries = PgQueries { conn };
            f(&mut queries)
        })
    }
}

/// One connection's view of the ledger tables.
struct PgQueries<'a> {
    conn: &'a mut PgConnection,
}

impl LedgerQueries for PgQueries<'_> {
    fn player_count(&mut self, guild_id: &str) -> StoreResult<i64> {
        players::table
            .filter(players::guild_id.eq(guild_id))
            .count()
            .get_result::<i64>(self.conn)
            .map_err(StoreError::from)
    }

    fn player_exists(&mut self, discord_id: &str, guild_id: &str) -> StoreResult<bool> {
        diesel::select(diesel::dsl::exists(
            players::table
                .filter(players::discord_id.eq(discord_id))
                .filter(players::guild_id.eq(guild_id)),
        ))
        .get_result::<bool>(self.conn)
        .map_err(StoreError::from)
    }

    fn insert_player(&mut self, player: &NewPlayer) -> StoreResult<Player> {
        diesel::insert_into(players::table)
            .values(NewPlayerRow::from(player))
            .get_result::<PlayerRow>(self.conn)
            .map(Player::from)
            .map_err(StoreError::from)
    }

    fn delete_player(&mut self, discord_id: &str, guild_id: &str) -> StoreResult<usize> {
        diesel::delete(
            players::table
                .filter(players::discord_id.eq(discord_id))
                .filter(players::guild_id.eq(guild_id)),
        )
        .execute(self.conn)
        .map_err(StoreError::from)
    }

    fn player(&mut self, discord_id: &str, guild_id: &str) -> StoreResult<Option<Player>> {
        players::table
            .filter(players::discord_id.eq(discord_id))
            .filter(players::guild_id.eq(guild_id))
            .first::<PlayerRow>(self.conn)
            .optional()
            .map(|row| row.map(Player::from))
            .map_err(StoreError::from)
    }

    fn roster(&mut self, guild_id: &str) -> StoreResult<Vec<PlayerBalance>> {
        players::table
            .inner_join(debts::table)
            .filter(players::guild_id.eq(guild_id))
            .order(debts::amount.desc())
            .then_order_by(upper(players::name).asc())
            .select((PlayerRow::as_select(), DebtRow::as_select()))
            .load::<(PlayerRow, DebtRow)>(self.conn)
            .map(|rows| {
                rows.into_iter()
                    .map(|(player, debt)| PlayerBalance {
                        player: Player::from(player),
                        debt: Debt::from(debt),
                    })
                    .collect()
            })
            .map_err(StoreError::from)
    }

    fn debt(&mut self, player_id: i32) -> StoreResult<Option<Debt>> {
        debts::table
            .filter(debts::player_id.eq(player_id))
            .first::<DebtRow>(self.conn)
            .optional()
            .map(|row| row.map(Debt::from))
            .map_err(StoreError::from)
    }

    fn debt_for_update(&mut self, player_id: i32) -> StoreResult<Option<Debt>> {
        debts::table
            .filter(debts::player_id.eq(player_id))
            .for_update()
            .first::<DebtRow>(self.conn)
            .optional()
            .map(|row| row.map(Debt::from))
            .map_err(StoreError::from)
    }

    fn insert_debt(&mut self, player_id: i32) -> StoreResult<Debt> {
        diesel::insert_into(debts::table)
            .values(crate::models::NewDebtRow {
                player_id,
                amount: 0,
            })
            .get_result::<DebtRow>(self.conn)
            .map(Debt::from)
            .map_err(StoreError::from)
    }

    fn set_debt_amount(&mut self, player_id: i32, amount: i64) -> StoreResult<()> {
        let rows = diesel::update(debts::table.filter(debts::player_id.eq(player_id)))
            .set((
                debts::amount.eq(amount),
                debts::last_updated.eq(diesel::dsl::now),
            ))
            .execute(self.conn)
            .map_err(StoreError::from)?;
        if rows == 0 {
            return Err(StoreError::new(StoreErrorKind::NotFound));
        }
        Ok(())
    }

    fn journal_window(&mut self, player_id: i32) -> StoreResult<Vec<JournalEntry>> {
        debt_journal::table
            .filter(debt_journal::player_id.eq(player_id))
            .order((debt_journal::recorded_at.desc(), debt_journal::id.desc()))
            .limit(JOURNAL_WINDOW)
            .load::<JournalEntryRow>(self.conn)
            .map(|rows| rows.into_iter().map(JournalEntry::from).collect())
            .map_err(StoreError::from)
    }

    fn insert_journal_entry(
        &mut self,
        player_id: i32,
        amount: i64,
        description: &str,
    ) -> StoreResult<JournalEntry> {
        diesel::insert_into(debt_journal::table)
            .values(NewJournalEntryRow {
                player_id,
                amount,
                description: description.to_string(),
            })
            .get_result::<JournalEntryRow>(self.conn)
            .map(JournalEntry::from)
            .map_err(StoreError::from)
    }

    fn update_journal_amount(&mut self, entry_id: i32, amount: i64) -> StoreResult<()> {
        let rows = diesel::update(debt_journal::table.find(entry_id))
            .set(debt_journal::amount.eq(amount))
            .execute(self.conn)
            .map_err(StoreError::from)?;
        if rows == 0 {
            return Err(StoreError::new(StoreErrorKind::NotFound));
        }
        Ok(())
    }

    fn delete_journal_entry(&mut self, entry_id: i32) -> StoreResult<()> {
        let rows = diesel::delete(debt_journal::table.find(entry_id))
            .execute(self.conn)
            .map_err(StoreError::from)?;
        if rows == 0 {
            return Err(StoreError::new(StoreErrorKind::NotFound));
        }
        Ok(())
    }

    fn trim_journal(&mut self, player_id: i32) -> StoreResult<usize> {
        let keep = debt_journal::table
            .filter(debt_journal::player_id.eq(player_id))
            .order((debt_journal::recorded_at.desc(), debt_journal::id.desc()))
            .limit(JOURNAL_WINDOW)
            .select(debt_journal::id)
            .load::<i32>(self.conn)
            .map_err(StoreError::from)?;
        diesel::delete(
            debt_journal::table
                .filter(debt_journal::player_id.eq(player_id))
                .filter(debt_journal::id.ne_all(keep)),
        )
        .execute(self.conn)
        .map_err(StoreError::from)
    }

    fn setup(&mut self, guild_id: &str) -> StoreResult<Option<GuildSetup>> {
        guild_setups::table
            .find(guild_id)
            .first::<GuildSetupRow>(self.conn)
            .optional()
            .map(|row| row.map(GuildSetup::from))
            .map_err(StoreError::from)
    }

    fn put_setup(&mut self, setup: &NewGuildSetup) -> StoreResult<GuildSetup> {
        diesel::insert_into(guild_setups::table)
            .values(NewGuildSetupRow::from(setup))
            .on_conflict(guild_setups::guild_id)
            .do_update()
            .set((
                guild_setups::channel_id.eq(&setup.channel_id),
                guild_setups::registration_message_id.eq(&setup.registration_message_id),
                guild_setups::board_message_id.eq(&setup.board_message_id),
                guild_setups::created_at.eq(diesel::dsl::now),
            ))
            .get_result::<GuildSetupRow>(self.conn)
            .map(GuildSetup::from)
            .map_err(StoreError::from)
    }

    fn delete_setup(&mut self, guild_id: &str) -> StoreResult<usize> {
        diesel::delete(guild_setups::table.find(guild_id))
            .execute(self.conn)
            .map_err(StoreError::from)
    }

    fn all_setups(&mut self) -> StoreResult<Vec<GuildSetup>> {
        guild_setups::table
            .load::<GuildSetupRow>(self.conn)
            .map(|rows| rows.into_iter().map(GuildSetup::from).collect())
            .map_err(StoreError::from)
    }
}
