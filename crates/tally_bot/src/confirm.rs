//! The two-step charge confirmation workflow.
//!
//! Selecting a player on the board mints a single-use token and answers
//! with an ephemeral prompt. Pressing Confirm consumes the token and
//! applies the standard charge; Cancel consumes it without charging. The
//! "I paid!" button resets the pressing member's own balance. Component
//! presses are acknowledged up front so the client settles even when the
//! ledger work behind them takes a while.

use crate::messenger::{ConfirmPrompt, Messenger};
use crate::setup::SetupManager;
use std::sync::Arc;
use tally_cache::PendingConfirmations;
use tally_database::LedgerStore;
use tally_error::{LedgerError, TallyResult};
use tally_ledger::DebtService;
use tally_models::{ComponentEvent, SelectEvent};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Amount applied when a confirmation goes through.
pub const CONFIRM_CHARGE: i64 = 10_000;

/// Journal description recorded for a confirmed charge.
pub const CHARGE_DESCRIPTION: &str = "10k in die Gildenbank";

/// Runs the select, confirm, cancel, and paid steps.
pub struct ConfirmationFlow<S> {
    service: Arc<DebtService<S>>,
    boards: Arc<SetupManager<S>>,
    messenger: Arc<dyn Messenger>,
    pending: Arc<PendingConfirmations>,
}

impl<S> ConfirmationFlow<S>
where
    S: LedgerStore,
{
    /// Wire the flow over the service, the board manager, the messenger,
    /// and the pending-token map.
    pub fn new(
        service: Arc<DebtService<S>>,
        boards: Arc<SetupManager<S>>,
        messenger: Arc<dyn Messenger>,
        pending: Arc<PendingConfirmations>,
    ) -> Self {
        Self {
            service,
            boards,
            messenger,
            pending,
        }
    }

    /// Answer a debtor selection with an ephemeral confirmation prompt.
    ///
    /// Mints a v4 token, stores it against the interaction token of this
    /// select (the prompt it produces is dismissed through that token
    /// later), and sends the prompt. Selections without exactly one value
    /// are dropped at debug level.
    #[instrument(skip(self, event), fields(guild_id = %event.guild_id, user_id = %event.user_id))]
    pub async fn select(&self, event: &SelectEvent) -> TallyResult<()> {
        let [debtor_id] = event.values.as_slice() else {
            debug!(count = event.values.len(), "expected exactly one selected value");
            return Ok(());
        };
        let player = self.service.player(debtor_id, &event.guild_id).await?;
        let token = Uuid::new_v4().to_string();
        self.pending
            .insert(token.as_str(), event.interaction.token.as_str());
        let prompt = ConfirmPrompt {
            text: format!("Do you really want to add 10k to {}?", player.name),
            user_id: player.discord_id,
            token,
        };
        self.messenger.send_prompt(&event.interaction, &prompt).await
    }

    /// Apply the standard charge for a confirmed prompt.
    ///
    /// Consumes the token. When it was still live: charge the debtor,
    /// refresh the board, dismiss the stored prompt. A token that expired
    /// or was already used only gets a debug line.
    #[instrument(skip(self, event, token), fields(guild_id = %event.guild_id))]
    pub async fn confirm(
        &self,
        event: &ComponentEvent,
        debtor_id: &str,
        token: &str,
    ) -> TallyResult<()> {
        self.messenger.acknowledge(&event.interaction).await?;
        let Some(stored) = self.pending.take(token) else {
            debug!("confirmation token expired or already used");
            return Ok(());
        };
        self.service
            .apply_delta(debtor_id, &event.guild_id, CONFIRM_CHARGE, CHARGE_DESCRIPTION)
            .await?;
        self.boards.refresh(&event.guild_id).await;
        self.dismiss(&stored).await;
        Ok(())
    }

    /// Drop a pending confirmation without charging anyone.
    #[instrument(skip(self, event, token), fields(guild_id = %event.guild_id))]
    pub async fn cancel(&self, event: &ComponentEvent, token: &str) -> TallyResult<()> {
        self.messenger.acknowledge(&event.interaction).await?;
        let Some(stored) = self.pending.take(token) else {
            debug!("cancel for a token that expired or was already used");
            return Ok(());
        };
        self.boards.refresh(&event.guild_id).await;
        self.dismiss(&stored).await;
        Ok(())
    }

    /// Reset the pressing member's own balance to zero.
    ///
    /// Presses from members who never registered are logged and dropped.
    #[instrument(skip(self, event), fields(guild_id = %event.guild_id, user_id = %event.user_id))]
    pub async fn paid(&self, event: &ComponentEvent) -> TallyResult<()> {
        self.messenger.acknowledge(&event.interaction).await?;
        match self
            .service
            .reset_balance(&event.user_id, &event.guild_id)
            .await
        {
            Ok(_) => {
                self.boards.refresh(&event.guild_id).await;
                Ok(())
            }
            Err(err) if err.as_ledger().is_some_and(LedgerError::is_ignorable) => {
                warn!(%err, "paid press from an unregistered member");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Delete the ephemeral prompt behind a stored interaction token. The
    /// prompt may be gone already, so failures only warn.
    async fn dismiss(&self, interaction_token: &str) {
        if let Err(err) = self.messenger.dismiss_prompt(interaction_token).await {
            warn!(%err, "could not dismiss the confirmation prompt");
        }
    }
}
