//! Gateway event routing.
//!
//! One dispatcher consumes the normalized [`GatewayEvent`] union and
//! routes it: registration reactions to the player registry, component
//! presses and selections to the confirmation flow. Events the bot has
//! no business with are dropped quietly.

use crate::confirm::ConfirmationFlow;
use crate::custom_id::{self, CustomId};
use crate::render;
use crate::setup::SetupManager;
use std::sync::Arc;
use tally_cache::RegistrationIndex;
use tally_database::LedgerStore;
use tally_error::{LedgerError, TallyResult};
use tally_ledger::DebtService;
use tally_models::{ComponentEvent, GatewayEvent, NewPlayer, ReactionEvent, SelectEvent};
use tracing::{debug, info, instrument, warn};

/// Routes gateway events to the workflows behind them.
pub struct Dispatcher<S> {
    service: Arc<DebtService<S>>,
    boards: Arc<SetupManager<S>>,
    confirmations: ConfirmationFlow<S>,
    index: Arc<RegistrationIndex>,
}

impl<S> Dispatcher<S>
where
    S: LedgerStore,
{
    /// Wire the dispatcher over the service, the board manager, the
    /// confirmation flow, and the registration-message index.
    pub fn new(
        service: Arc<DebtService<S>>,
        boards: Arc<SetupManager<S>>,
        confirmations: ConfirmationFlow<S>,
        index: Arc<RegistrationIndex>,
    ) -> Self {
        Self {
            service,
            boards,
            confirmations,
            index,
        }
    }

    /// Route one event.
    #[instrument(skip(self, event))]
    pub async fn dispatch(&self, event: GatewayEvent) -> TallyResult<()> {
        match event {
            GatewayEvent::ReactionAdded(reaction) => self.reaction_added(&reaction).await,
            GatewayEvent::ReactionRemoved(reaction) => self.reaction_removed(&reaction).await,
            GatewayEvent::ComponentPressed(component) => self.component_pressed(&component).await,
            GatewayEvent::OptionSelected(select) => self.option_selected(&select).await,
        }
    }

    /// A coin reaction on a registration message registers the member.
    async fn reaction_added(&self, event: &ReactionEvent) -> TallyResult<()> {
        if !self.concerns_registration(event) {
            return Ok(());
        }
        match self.service.register_player(player_from_reaction(event)).await {
            Ok(player) => {
                info!(guild_id = %event.guild_id, name = %player.name, "registered a player");
            }
            Err(err) if err.as_ledger().is_some_and(LedgerError::is_ignorable) => {
                warn!(user_id = %event.user_id, %err, "dropping registration");
                return Ok(());
            }
            Err(err) => return Err(err),
        }
        self.boards.refresh(&event.guild_id).await;
        Ok(())
    }

    /// Removing the coin reaction unregisters the member again.
    async fn reaction_removed(&self, event: &ReactionEvent) -> TallyResult<()> {
        if !self.concerns_registration(event) {
            return Ok(());
        }
        match self
            .service
            .remove_player(&event.user_id, &event.guild_id)
            .await
        {
            Ok(()) => {
                info!(guild_id = %event.guild_id, user_id = %event.user_id, "unregistered a player");
            }
            Err(err) if err.as_ledger().is_some_and(LedgerError::is_ignorable) => {
                warn!(user_id = %event.user_id, %err, "dropping unregistration");
                return Ok(());
            }
            Err(err) => return Err(err),
        }
        self.boards.refresh(&event.guild_id).await;
        Ok(())
    }

    async fn component_pressed(&self, event: &ComponentEvent) -> TallyResult<()> {
        match CustomId::parse(&event.custom_id) {
            Ok(CustomId::Paid) => self.confirmations.paid(event).await,
            Ok(CustomId::Confirm { user_id, token }) => {
                self.confirmations.confirm(event, &user_id, &token).await
            }
            Ok(CustomId::Cancel { token, .. }) => self.confirmations.cancel(event, &token).await,
            Ok(CustomId::SelectDebtor) => {
                debug!("select custom id arrived as a button press");
                Ok(())
            }
            Err(err) => {
                debug!(custom_id = %event.custom_id, %err, "ignoring unknown component");
                Ok(())
            }
        }
    }

    async fn option_selected(&self, event: &SelectEvent) -> TallyResult<()> {
        if event.custom_id == custom_id::SELECT_DEBTOR {
            self.confirmations.select(event).await
        } else {
            debug!(custom_id = %event.custom_id, "ignoring unknown select menu");
            Ok(())
        }
    }

    /// Reactions count only on a known registration message, and only
    /// with the coin emoji. The index is checked before any database
    /// work happens.
    fn concerns_registration(&self, event: &ReactionEvent) -> bool {
        if !self.index.is_registration_message(&event.message_id) {
            return false;
        }
        if event.emoji != render::REGISTRATION_EMOJI {
            debug!(emoji = %event.emoji, "ignoring reaction with a different emoji");
            return false;
        }
        true
    }
}

/// Build the registration payload from a reaction. Payloads without
/// member data fall back to the account name, then the user id.
fn player_from_reaction(event: &ReactionEvent) -> NewPlayer {
    let account = event
        .user_name
        .clone()
        .unwrap_or_else(|| event.user_id.clone());
    let name = event.display_name.clone().unwrap_or_else(|| account.clone());
    NewPlayer::new(event.user_id.as_str(), account, event.guild_id.as_str(), name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messenger::Messenger;
    use crate::testing::{Call, RecordingMessenger};
    use tally_cache::{ConfirmationCacheConfig, PendingConfirmations};
    use tally_database::MemoryLedgerStore;
    use tally_models::InteractionHandle;

    const GUILD: &str = "guild-1";

    struct Fixture {
        service: Arc<DebtService<MemoryLedgerStore>>,
        messenger: Arc<RecordingMessenger>,
        registration_message_id: String,
        dispatcher: Dispatcher<MemoryLedgerStore>,
    }

    async fn fixture() -> Fixture {
        let service = Arc::new(DebtService::new(Arc::new(MemoryLedgerStore::new())));
        let index = Arc::new(RegistrationIndex::new());
        let messenger = Arc::new(RecordingMessenger::new());
        let boards = Arc::new(SetupManager::new(
            Arc::clone(&service),
            Arc::clone(&messenger) as Arc<dyn Messenger>,
            Arc::clone(&index),
        ));
        let setup = boards.install(GUILD, "chan-1").await.unwrap();
        let pending = Arc::new(PendingConfirmations::new(ConfirmationCacheConfig::default()));
        let confirmations = ConfirmationFlow::new(
            Arc::clone(&service),
            Arc::clone(&boards),
            Arc::clone(&messenger) as Arc<dyn Messenger>,
            pending,
        );
        let dispatcher = Dispatcher::new(
            Arc::clone(&service),
            boards,
            confirmations,
            Arc::clone(&index),
        );
        Fixture {
            service,
            messenger,
            registration_message_id: setup.registration_message_id,
            dispatcher,
        }
    }

    fn reaction(message_id: &str, emoji: &str) -> ReactionEvent {
        ReactionEvent {
            guild_id: GUILD.to_string(),
            channel_id: "chan-1".to_string(),
            message_id: message_id.to_string(),
            user_id: "user-1".to_string(),
            user_name: Some("torfstack".to_string()),
            display_name: Some("Torfstack".to_string()),
            emoji: emoji.to_string(),
        }
    }

    fn coin_reaction(f: &Fixture) -> ReactionEvent {
        reaction(&f.registration_message_id, render::REGISTRATION_EMOJI)
    }

    #[tokio::test]
    async fn coin_reactions_register_the_member() {
        let f = fixture().await;

        f.dispatcher
            .dispatch(GatewayEvent::ReactionAdded(coin_reaction(&f)))
            .await
            .unwrap();

        let roster = f.service.roster(GUILD).await.unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].name(), "Torfstack");
        assert!(
            f.messenger
                .calls()
                .iter()
                .any(|call| matches!(call, Call::EditBoard { .. }))
        );
    }

    #[tokio::test]
    async fn reactions_on_other_messages_are_ignored() {
        let f = fixture().await;

        f.dispatcher
            .dispatch(GatewayEvent::ReactionAdded(reaction(
                "some-other-message",
                render::REGISTRATION_EMOJI,
            )))
            .await
            .unwrap();

        assert!(f.service.roster(GUILD).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reactions_with_a_different_emoji_are_ignored() {
        let f = fixture().await;

        f.dispatcher
            .dispatch(GatewayEvent::ReactionAdded(reaction(
                &f.registration_message_id,
                "👍",
            )))
            .await
            .unwrap();

        assert!(f.service.roster(GUILD).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_registrations_are_dropped_with_a_warning() {
        let f = fixture().await;
        let event = GatewayEvent::ReactionAdded(coin_reaction(&f));

        f.dispatcher.dispatch(event.clone()).await.unwrap();
        f.dispatcher.dispatch(event).await.unwrap();

        assert_eq!(f.service.roster(GUILD).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn removing_the_reaction_unregisters_the_member() {
        let f = fixture().await;
        f.dispatcher
            .dispatch(GatewayEvent::ReactionAdded(coin_reaction(&f)))
            .await
            .unwrap();

        let mut removed = coin_reaction(&f);
        removed.user_name = None;
        removed.display_name = None;
        f.dispatcher
            .dispatch(GatewayEvent::ReactionRemoved(removed))
            .await
            .unwrap();

        assert!(f.service.roster(GUILD).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unregistering_an_unknown_member_is_dropped_with_a_warning() {
        let f = fixture().await;

        f.dispatcher
            .dispatch(GatewayEvent::ReactionRemoved(coin_reaction(&f)))
            .await
            .unwrap();

        assert!(f.service.roster(GUILD).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_member_names_fall_back_to_the_user_id() {
        let f = fixture().await;
        let mut event = coin_reaction(&f);
        event.user_name = None;
        event.display_name = None;

        f.dispatcher
            .dispatch(GatewayEvent::ReactionAdded(event))
            .await
            .unwrap();

        let roster = f.service.roster(GUILD).await.unwrap();
        assert_eq!(roster[0].name(), "user-1");
    }

    #[tokio::test]
    async fn selections_and_presses_run_the_confirmation_flow() {
        let f = fixture().await;
        f.dispatcher
            .dispatch(GatewayEvent::ReactionAdded(coin_reaction(&f)))
            .await
            .unwrap();

        f.dispatcher
            .dispatch(GatewayEvent::OptionSelected(SelectEvent {
                guild_id: GUILD.to_string(),
                user_id: "presser".to_string(),
                custom_id: custom_id::SELECT_DEBTOR.to_string(),
                values: vec!["user-1".to_string()],
                interaction: InteractionHandle::new(7, "int-select"),
            }))
            .await
            .unwrap();

        let token = f
            .messenger
            .calls()
            .into_iter()
            .find_map(|call| match call {
                Call::SendPrompt { token, .. } => Some(token),
                _ => None,
            })
            .unwrap();
        f.dispatcher
            .dispatch(GatewayEvent::ComponentPressed(ComponentEvent {
                guild_id: GUILD.to_string(),
                user_id: "presser".to_string(),
                custom_id: CustomId::confirm("user-1", token).to_string(),
                interaction: InteractionHandle::new(8, "int-confirm"),
            }))
            .await
            .unwrap();

        let debt = f.service.balance("user-1", GUILD).await.unwrap();
        assert_eq!(debt.amount, crate::confirm::CONFIRM_CHARGE);
    }

    #[tokio::test]
    async fn unknown_custom_ids_are_dropped() {
        let f = fixture().await;
        let before = f.messenger.calls().len();

        f.dispatcher
            .dispatch(GatewayEvent::ComponentPressed(ComponentEvent {
                guild_id: GUILD.to_string(),
                user_id: "presser".to_string(),
                custom_id: "SOMETHING_ELSE".to_string(),
                interaction: InteractionHandle::new(9, "int-unknown"),
            }))
            .await
            .unwrap();

        assert_eq!(f.messenger.calls().len(), before);
    }
}
