//! The debt service.
//!
//! Every balance mutation in the system funnels through
//! [`DebtService::apply_delta`] (or [`DebtService::reset_balance`], which
//! computes the exact negative delta inside the same transaction). The
//! service resolves players, enforces the balance bounds, reconciles the
//! journal, and leans on the store's transaction semantics so a failure at
//! any step leaves nothing half-written.

use crate::journal::{JournalAction, consume_plan};
use std::sync::Arc;
use tally_database::{LedgerQueries, LedgerStore};
use tally_error::{LedgerError, LedgerErrorKind, TallyResult};
use tally_models::{
    Debt, GuildSetup, JournalEntry, MAX_BALANCE, NewGuildSetup, NewPlayer, Player, PlayerBalance,
    ROSTER_CAP,
};
use tracing::instrument;

/// Registration, balances, journal, and setup rows over a [`LedgerStore`].
pub struct DebtService<S> {
    store: Arc<S>,
}

impl<S> DebtService<S>
where
    S: LedgerStore,
{
    /// Create a service over a store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Register a player and its zero balance in one transaction.
    ///
    /// Fails with `RosterFull` at the per-guild cap and `AlreadyRegistered`
    /// for a duplicate (user, guild) pair.
    #[instrument(skip(self, new_player), fields(discord_id = %new_player.discord_id, guild_id = %new_player.guild_id))]
    pub async fn register_player(&self, new_player: NewPlayer) -> TallyResult<Player> {
        self.store
            .transaction(move |queries| {
                if queries.player_count(&new_player.guild_id)? >= ROSTER_CAP {
                    return Err(LedgerError::new(LedgerErrorKind::RosterFull(
                        new_player.guild_id.clone(),
                    ))
                    .into());
                }
                if queries.player_exists(&new_player.discord_id, &new_player.guild_id)? {
                    return Err(LedgerError::new(LedgerErrorKind::AlreadyRegistered(
                        new_player.name.clone(),
                    ))
                    .into());
                }
                let player = queries.insert_player(&new_player)?;
                queries.insert_debt(player.id)?;
                Ok(player)
            })
            .await
    }

    /// Remove a player's registration.
    ///
    /// Balance and journal rows stay behind; nothing reads them once the
    /// player row is gone, and re-registration starts from a fresh id.
    #[instrument(skip(self))]
    pub async fn remove_player(&self, discord_id: &str, guild_id: &str) -> TallyResult<()> {
        let discord_id = discord_id.to_string();
        let guild_id = guild_id.to_string();
        self.store
            .transaction(move |queries| {
                if queries.delete_player(&discord_id, &guild_id)? == 0 {
                    return Err(
                        LedgerError::new(LedgerErrorKind::UnknownPlayer(discord_id.clone())).into(),
                    );
                }
                Ok(())
            })
            .await
    }

    /// Fetch one registered player.
    #[instrument(skip(self))]
    pub async fn player(&self, discord_id: &str, guild_id: &str) -> TallyResult<Player> {
        let discord_id = discord_id.to_string();
        let guild_id = guild_id.to_string();
        self.store
            .read(move |queries| {
                queries.player(&discord_id, &guild_id)?.ok_or_else(|| {
                    LedgerError::new(LedgerErrorKind::UnknownPlayer(discord_id.clone())).into()
                })
            })
            .await
    }

    /// Everyone registered in a guild with their balances, ordered by amount
    /// descending, then case-insensitively by name.
    #[instrument(skip(self))]
    pub async fn roster(&self, guild_id: &str) -> TallyResult<Vec<PlayerBalance>> {
        let guild_id = guild_id.to_string();
        self.store
            .read(move |queries| Ok(queries.roster(&guild_id)?))
            .await
    }

    /// A player's current balance.
    #[instrument(skip(self))]
    pub async fn balance(&self, discord_id: &str, guild_id: &str) -> TallyResult<Debt> {
        let discord_id = discord_id.to_string();
        let guild_id = guild_id.to_string();
        self.store
            .read(move |queries| {
                let player = queries.player(&discord_id, &guild_id)?.ok_or_else(|| {
                    LedgerError::new(LedgerErrorKind::UnknownPlayer(discord_id.clone()))
                })?;
                let debt = queries
                    .debt(player.id)?
                    .ok_or_else(|| LedgerError::new(LedgerErrorKind::MissingDebt(player.id)))?;
                Ok(debt)
            })
            .await
    }

    /// A player's visible journal window, newest entry first.
    #[instrument(skip(self))]
    pub async fn journal(
        &self,
        discord_id: &str,
        guild_id: &str,
    ) -> TallyResult<Vec<JournalEntry>> {
        let discord_id = discord_id.to_string();
        let guild_id = guild_id.to_string();
        self.store
            .read(move |queries| {
                let player = queries.player(&discord_id, &guild_id)?.ok_or_else(|| {
                    LedgerError::new(LedgerErrorKind::UnknownPlayer(discord_id.clone()))
                })?;
                Ok(queries.journal_window(player.id)?)
            })
            .await
    }

    /// Apply a signed delta to a player's balance.
    ///
    /// Runs as one transaction: resolve the player, lock and bounds-check
    /// the balance, write it, reconcile the journal. Zero deltas are
    /// rejected before the transaction starts. The returned debt reflects
    /// the committed state.
    #[instrument(skip(self, description))]
    pub async fn apply_delta(
        &self,
        discord_id: &str,
        guild_id: &str,
        delta: i64,
        description: &str,
    ) -> TallyResult<Debt> {
        if delta == 0 {
            return Err(LedgerError::new(LedgerErrorKind::ZeroDelta).into());
        }
        let discord_id = discord_id.to_string();
        let guild_id = guild_id.to_string();
        let description = description.to_string();
        self.store
            .transaction(move |queries| {
                let player = queries.player(&discord_id, &guild_id)?.ok_or_else(|| {
                    LedgerError::new(LedgerErrorKind::UnknownPlayer(discord_id.clone()))
                })?;
                let debt = queries
                    .debt_for_update(player.id)?
                    .ok_or_else(|| LedgerError::new(LedgerErrorKind::MissingDebt(player.id)))?;
                apply_to_debt(queries, &player, &debt, delta, &description)
            })
            .await
    }

    /// Reset a player's balance to zero by applying the exact negative of
    /// the current amount. A balance already at zero is left untouched.
    #[instrument(skip(self))]
    pub async fn reset_balance(&self, discord_id: &str, guild_id: &str) -> TallyResult<Debt> {
        let discord_id = discord_id.to_string();
        let guild_id = guild_id.to_string();
        self.store
            .transaction(move |queries| {
                let player = queries.player(&discord_id, &guild_id)?.ok_or_else(|| {
                    LedgerError::new(LedgerErrorKind::UnknownPlayer(discord_id.clone()))
                })?;
                let debt = queries
                    .debt_for_update(player.id)?
                    .ok_or_else(|| LedgerError::new(LedgerErrorKind::MissingDebt(player.id)))?;
                if debt.amount == 0 {
                    return Ok(debt);
                }
                let delta = -debt.amount;
                apply_to_debt(queries, &player, &debt, delta, "")
            })
            .await
    }

    /// A guild's setup row, when one is stored.
    #[instrument(skip(self))]
    pub async fn setup(&self, guild_id: &str) -> TallyResult<Option<GuildSetup>> {
        let guild_id = guild_id.to_string();
        self.store
            .read(move |queries| Ok(queries.setup(&guild_id)?))
            .await
    }

    /// Store a guild's setup row, replacing any previous one.
    #[instrument(skip(self, setup), fields(guild_id = %setup.guild_id))]
    pub async fn put_setup(&self, setup: NewGuildSetup) -> TallyResult<GuildSetup> {
        self.store
            .transaction(move |queries| Ok(queries.put_setup(&setup)?))
            .await
    }

    /// Delete a guild's setup row. Missing rows are fine; teardown calls
    /// this without knowing whether an install ever finished.
    #[instrument(skip(self))]
    pub async fn delete_setup(&self, guild_id: &str) -> TallyResult<usize> {
        let guild_id = guild_id.to_string();
        self.store
            .transaction(move |queries| Ok(queries.delete_setup(&guild_id)?))
            .await
    }

    /// Every stored setup row.
    #[instrument(skip(self))]
    pub async fn all_setups(&self) -> TallyResult<Vec<GuildSetup>> {
        self.store
            .read(move |queries| Ok(queries.all_setups()?))
            .await
    }
}

/// Bounds-check and write a balance change, then reconcile the journal.
/// Runs inside the caller's transaction.
fn apply_to_debt(
    queries: &mut dyn LedgerQueries,
    player: &Player,
    debt: &Debt,
    delta: i64,
    description: &str,
) -> TallyResult<Debt> {
    if !(0..=MAX_BALANCE).contains(&debt.amount) {
        return Err(LedgerError::new(LedgerErrorKind::CorruptBalance(debt.amount)).into());
    }
    let new_amount = debt.amount + delta;
    if new_amount < 0 {
        return Err(LedgerError::new(LedgerErrorKind::BalanceWouldGoNegative {
            current: debt.amount,
            delta,
        })
        .into());
    }
    if new_amount > MAX_BALANCE {
        return Err(LedgerError::new(LedgerErrorKind::BalanceTooHigh {
            current: debt.amount,
            delta,
        })
        .into());
    }

    queries.set_debt_amount(player.id, new_amount)?;

    if delta > 0 {
        queries.insert_journal_entry(player.id, delta, description)?;
        queries.trim_journal(player.id)?;
    } else {
        let mut window = queries.journal_window(player.id)?;
        window.reverse();
        for action in consume_plan(&window, delta) {
            match action {
                JournalAction::Delete(id) => queries.delete_journal_entry(id)?,
                JournalAction::SetAmount { id, amount } => {
                    queries.update_journal_amount(id, amount)?
                }
            }
        }
    }

    let debt = queries
        .debt(player.id)?
        .ok_or_else(|| LedgerError::new(LedgerErrorKind::MissingDebt(player.id)))?;
    tracing::debug!(
        player_id = player.id,
        amount = debt.amount,
        "balance updated"
    );
    Ok(debt)
}
