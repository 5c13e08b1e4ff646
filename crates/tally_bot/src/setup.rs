//! Guild setup lifecycle.
//!
//! A guild's bank lives in two messages: the registration prompt members
//! react to and the debt board. Installing tears the previous pair down
//! (best effort), posts fresh messages, persists the new row, and keeps
//! the registration-message index current.

use crate::messenger::Messenger;
use crate::render::BoardView;
use std::sync::Arc;
use tally_cache::RegistrationIndex;
use tally_database::LedgerStore;
use tally_error::TallyResult;
use tally_ledger::DebtService;
use tally_models::{GuildSetup, NewGuildSetup};
use tracing::{info, instrument, warn};

/// Installs, refreshes, and tears down guild setups.
pub struct SetupManager<S> {
    service: Arc<DebtService<S>>,
    messenger: Arc<dyn Messenger>,
    index: Arc<RegistrationIndex>,
}

impl<S> SetupManager<S>
where
    S: LedgerStore,
{
    /// Wire a manager over the service, the messenger, and the index.
    pub fn new(
        service: Arc<DebtService<S>>,
        messenger: Arc<dyn Messenger>,
        index: Arc<RegistrationIndex>,
    ) -> Self {
        Self {
            service,
            messenger,
            index,
        }
    }

    /// Install the bank messages in a channel, replacing any previous
    /// install for the guild.
    ///
    /// Old messages are deleted best effort: a failed deletion is logged
    /// and the install continues. Posting or persisting failures abort
    /// with the underlying error.
    #[instrument(skip(self))]
    pub async fn install(&self, guild_id: &str, channel_id: &str) -> TallyResult<GuildSetup> {
        if let Some(old) = self.service.setup(guild_id).await? {
            self.tear_down(&old).await;
            self.service.delete_setup(guild_id).await?;
        }

        let registration_message_id = self.messenger.post_registration_prompt(channel_id).await?;
        let roster = self.service.roster(guild_id).await?;
        let board = BoardView::from_roster(&roster);
        let board_message_id = self.messenger.post_board(channel_id, &board).await?;

        let setup = self
            .service
            .put_setup(NewGuildSetup::new(
                guild_id,
                channel_id,
                registration_message_id.as_str(),
                board_message_id.as_str(),
            ))
            .await?;
        self.index.insert(&setup.registration_message_id);
        info!(guild_id, channel_id, "installed guild setup");
        Ok(setup)
    }

    /// Delete a setup's messages and drop its registration message from
    /// the index. Deletion failures are logged and ignored.
    async fn tear_down(&self, old: &GuildSetup) {
        if let Err(err) = self
            .messenger
            .delete_message(&old.channel_id, &old.board_message_id)
            .await
        {
            warn!(guild_id = %old.guild_id, %err, "could not delete old board message");
        }
        if let Err(err) = self
            .messenger
            .delete_message(&old.channel_id, &old.registration_message_id)
            .await
        {
            warn!(guild_id = %old.guild_id, %err, "could not delete old registration message");
        }
        self.index.remove(&old.registration_message_id);
    }

    /// Re-render the board from the current roster.
    ///
    /// Called after every balance change, so failures (no setup yet, a
    /// deleted board message) are logged and swallowed.
    #[instrument(skip(self))]
    pub async fn refresh(&self, guild_id: &str) {
        if let Err(err) = self.try_refresh(guild_id).await {
            warn!(guild_id, %err, "could not refresh the board");
        }
    }

    async fn try_refresh(&self, guild_id: &str) -> TallyResult<()> {
        let Some(setup) = self.service.setup(guild_id).await? else {
            warn!(guild_id, "no setup stored, skipping board refresh");
            return Ok(());
        };
        let roster = self.service.roster(guild_id).await?;
        let board = BoardView::from_roster(&roster);
        self.messenger
            .edit_board(&setup.channel_id, &setup.board_message_id, &board)
            .await
    }
}
