//! Serenity event handler.
//!
//! The thin edge between the gateway and the workflows: raw payloads are
//! translated into [`GatewayEvent`]s and handed to the dispatcher, slash
//! commands go to the command runner, and the slash commands themselves
//! are registered at ready. Payloads the workflows cannot use, reactions
//! outside a guild or with a custom emoji, are dropped at debug level.

use crate::commands::{self, CommandRunner};
use crate::dispatch::Dispatcher;
use async_trait::async_trait;
use serenity::client::{Context, EventHandler};
use serenity::model::application::{Command, ComponentInteractionDataKind, Interaction};
use serenity::model::channel::{Reaction, ReactionType};
use serenity::model::gateway::Ready;
use tally_database::LedgerStore;
use tally_models::{ComponentEvent, GatewayEvent, InteractionHandle, ReactionEvent, SelectEvent};
use tracing::{debug, error, info};

/// Event handler wiring the gateway to the dispatcher and the commands.
pub struct TallyHandler<S> {
    dispatcher: Dispatcher<S>,
    commands: CommandRunner<S>,
}

impl<S> TallyHandler<S>
where
    S: LedgerStore + 'static,
{
    /// Wire the handler from its two consumers.
    pub fn new(dispatcher: Dispatcher<S>, commands: CommandRunner<S>) -> Self {
        Self {
            dispatcher,
            commands,
        }
    }

    async fn dispatch(&self, event: GatewayEvent) {
        if let Err(err) = self.dispatcher.dispatch(event).await {
            error!(%err, "event handling failed");
        }
    }
}

#[async_trait]
impl<S> EventHandler for TallyHandler<S>
where
    S: LedgerStore + 'static,
{
    async fn ready(&self, ctx: Context, ready: Ready) {
        if let Err(err) = Command::set_global_commands(&ctx.http, commands::definitions()).await {
            error!(%err, "could not register the slash commands");
            return;
        }
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "connected");
    }

    async fn reaction_add(&self, _ctx: Context, add_reaction: Reaction) {
        let Some(event) = reaction_event(&add_reaction) else {
            debug!("ignoring a reaction outside a guild or with a custom emoji");
            return;
        };
        self.dispatch(GatewayEvent::ReactionAdded(event)).await;
    }

    async fn reaction_remove(&self, _ctx: Context, removed_reaction: Reaction) {
        let Some(event) = reaction_event(&removed_reaction) else {
            debug!("ignoring a reaction outside a guild or with a custom emoji");
            return;
        };
        self.dispatch(GatewayEvent::ReactionRemoved(event)).await;
    }

    async fn interaction_create(&self, _ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command) => {
                if let Err(err) = self.commands.run(&command).await {
                    error!(command = %command.data.name, %err, "command failed");
                }
            }
            Interaction::Component(component) => {
                let Some(guild_id) = component.guild_id else {
                    debug!("ignoring a component press outside a guild");
                    return;
                };
                let handle =
                    InteractionHandle::new(component.id.get(), component.token.as_str());
                let event = match &component.data.kind {
                    ComponentInteractionDataKind::StringSelect { values } => {
                        GatewayEvent::OptionSelected(SelectEvent {
                            guild_id: guild_id.to_string(),
                            user_id: component.user.id.to_string(),
                            custom_id: component.data.custom_id.clone(),
                            values: values.clone(),
                            interaction: handle,
                        })
                    }
                    ComponentInteractionDataKind::Button => {
                        GatewayEvent::ComponentPressed(ComponentEvent {
                            guild_id: guild_id.to_string(),
                            user_id: component.user.id.to_string(),
                            custom_id: component.data.custom_id.clone(),
                            interaction: handle,
                        })
                    }
                    other => {
                        debug!(?other, "ignoring an unsupported component kind");
                        return;
                    }
                };
                self.dispatch(event).await;
            }
            _ => {}
        }
    }
}

/// Normalize a reaction payload. Reactions outside a guild, without a
/// user, or with a custom emoji answer `None`. Removal payloads carry no
/// member, so the name fields stay empty there.
fn reaction_event(reaction: &Reaction) -> Option<ReactionEvent> {
    let guild_id = reaction.guild_id?;
    let user_id = reaction.user_id?;
    let ReactionType::Unicode(emoji) = &reaction.emoji else {
        return None;
    };
    let member = reaction.member.as_ref();
    Some(ReactionEvent {
        guild_id: guild_id.to_string(),
        channel_id: reaction.channel_id.to_string(),
        message_id: reaction.message_id.to_string(),
        user_id: user_id.to_string(),
        user_name: member.map(|member| member.user.name.clone()),
        display_name: member.map(|member| member.display_name().to_string()),
        emoji: emoji.clone(),
    })
}
