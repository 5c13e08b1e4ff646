//! Slash command definitions and execution.
//!
//! Commands answer ephemerally through the [`Messenger`], so nothing here
//! talks to the HTTP client directly. Ledger rejections are turned into
//! their display text; everything else gets a generic apology and a log
//! line.

use crate::messenger::Messenger;
use crate::render::{self, BoardView};
use crate::setup::SetupManager;
use serenity::builder::{CreateCommand, CreateCommandOption};
use serenity::model::application::{
    CommandInteraction, CommandOptionType, ResolvedOption, ResolvedValue,
};
use serenity::model::channel::PartialChannel;
use serenity::model::guild::PartialMember;
use serenity::model::user::User;
use std::sync::Arc;
use tally_database::LedgerStore;
use tally_error::{TallyError, TallyErrorKind, TallyResult};
use tally_ledger::DebtService;
use tally_models::{InteractionHandle, NewPlayer};
use tracing::{error, instrument, warn};

/// The commands the bot registers at ready.
pub fn definitions() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("setup")
            .description("Setze den Channel für 10k updates")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Channel,
                    "channel",
                    "Channel für 10k updates",
                )
                .required(true),
            ),
        CreateCommand::new("debt")
            .description("Packt 10k in die Gildenbank!")
            .add_option(
                CreateCommandOption::new(CommandOptionType::User, "member", "Name des Spielers")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "amount",
                    "Betrag, kann negativ sein",
                )
                .required(true),
            )
            .add_option(CreateCommandOption::new(
                CommandOptionType::String,
                "reason",
                "Grund der Schulden",
            )),
        CreateCommand::new("journal")
            .description("Die letzten Einträge im Schuldenbuch")
            .add_option(
                CreateCommandOption::new(CommandOptionType::User, "member", "Name des Spielers")
                    .required(true),
            ),
        CreateCommand::new("roster").description("Wer packt 10k in die Gildenbank?"),
        CreateCommand::new("refresh").description("Aktualisiert das Schuldenbrett"),
        CreateCommand::new("register")
            .description("Registriert einen Spieler")
            .add_option(
                CreateCommandOption::new(CommandOptionType::User, "member", "Name des Spielers")
                    .required(true),
            ),
        CreateCommand::new("unregister")
            .description("Entfernt einen Spieler")
            .add_option(
                CreateCommandOption::new(CommandOptionType::User, "member", "Name des Spielers")
                    .required(true),
            ),
    ]
}

/// Executes slash commands against the ledger.
pub struct CommandRunner<S> {
    service: Arc<DebtService<S>>,
    boards: Arc<SetupManager<S>>,
    messenger: Arc<dyn Messenger>,
    admin_user_id: String,
}

impl<S> CommandRunner<S>
where
    S: LedgerStore,
{
    /// Wire the runner. `admin_user_id` gates setup, register, and
    /// unregister.
    pub fn new(
        service: Arc<DebtService<S>>,
        boards: Arc<SetupManager<S>>,
        messenger: Arc<dyn Messenger>,
        admin_user_id: impl Into<String>,
    ) -> Self {
        Self {
            service,
            boards,
            messenger,
            admin_user_id: admin_user_id.into(),
        }
    }

    /// Run one command interaction and answer it ephemerally.
    #[instrument(skip(self, interaction), fields(command = %interaction.data.name))]
    pub async fn run(&self, interaction: &CommandInteraction) -> TallyResult<()> {
        let handle = InteractionHandle::new(interaction.id.get(), interaction.token.as_str());
        let Some(guild_id) = interaction.guild_id else {
            return self
                .messenger
                .respond_ephemeral(&handle, "This only works inside a guild")
                .await;
        };
        let guild_id = guild_id.to_string();
        let options = interaction.data.options();

        let reply = match interaction.data.name.as_str() {
            "setup" => self.setup(interaction, &guild_id, &options).await,
            "debt" => self.debt(&guild_id, &options).await,
            "journal" => self.journal(&guild_id, &options).await,
            "roster" => self.roster(&guild_id).await,
            "refresh" => self.refresh(&guild_id).await,
            "register" => self.register(interaction, &guild_id, &options).await,
            "unregister" => self.unregister(interaction, &guild_id, &options).await,
            other => {
                warn!(command = other, "unknown command");
                Ok("Unknown command".to_string())
            }
        };
        let text = match reply {
            Ok(text) => text,
            Err(err) => {
                error!(%err, "command failed");
                user_message(&err)
            }
        };
        self.messenger.respond_ephemeral(&handle, &text).await
    }

    async fn setup(
        &self,
        interaction: &CommandInteraction,
        guild_id: &str,
        options: &[ResolvedOption<'_>],
    ) -> TallyResult<String> {
        if !self.is_admin(interaction) {
            return Ok("You are not allowed to set the channel, ask the admin!".to_string());
        }
        let Some(channel) = channel_option(options, "channel") else {
            return Ok("Could not set channel".to_string());
        };
        self.boards
            .install(guild_id, &channel.id.to_string())
            .await?;
        Ok("Channel set successfully".to_string())
    }

    async fn debt(&self, guild_id: &str, options: &[ResolvedOption<'_>]) -> TallyResult<String> {
        let Some((user, _)) = user_option(options, "member") else {
            return Ok("Could not update debt".to_string());
        };
        let Some(amount) = integer_option(options, "amount") else {
            return Ok("Could not update debt".to_string());
        };
        let reason = string_option(options, "reason").unwrap_or_default();

        let player = self.service.player(&user.id.to_string(), guild_id).await?;
        self.service
            .apply_delta(&player.discord_id, guild_id, amount, reason)
            .await?;
        self.boards.refresh(guild_id).await;
        Ok(if amount < 0 {
            format!("Removed {} from {}", -amount, player.name)
        } else {
            format!("Added {amount} to {}, because '{reason}'", player.name)
        })
    }

    async fn journal(&self, guild_id: &str, options: &[ResolvedOption<'_>]) -> TallyResult<String> {
        let Some((user, _)) = user_option(options, "member") else {
            return Ok("Could not get journal entries".to_string());
        };
        let player = self.service.player(&user.id.to_string(), guild_id).await?;
        let entries = self.service.journal(&player.discord_id, guild_id).await?;
        if entries.is_empty() {
            return Ok("No journal entries found".to_string());
        }
        Ok(format!(
            "Journal entries of {}{}",
            player.name,
            render::journal_block(&entries)
        ))
    }

    async fn roster(&self, guild_id: &str) -> TallyResult<String> {
        let roster = self.service.roster(guild_id).await?;
        let board = BoardView::from_roster(&roster);
        match render::board_field(&board.rows) {
            Some(block) => Ok(block),
            None => Ok("No players registered".to_string()),
        }
    }

    async fn refresh(&self, guild_id: &str) -> TallyResult<String> {
        self.boards.refresh(guild_id).await;
        Ok("Debts refreshed successfully".to_string())
    }

    async fn register(
        &self,
        interaction: &CommandInteraction,
        guild_id: &str,
        options: &[ResolvedOption<'_>],
    ) -> TallyResult<String> {
        if !self.is_admin(interaction) {
            return Ok("You are not allowed to add a player, ask the admin!".to_string());
        }
        let Some((user, member)) = user_option(options, "member") else {
            return Ok("Could not add player".to_string());
        };
        let player = self
            .service
            .register_player(new_player_from(user, member, guild_id))
            .await?;
        self.boards.refresh(guild_id).await;
        Ok(format!("Added player {}", player.name))
    }

    async fn unregister(
        &self,
        interaction: &CommandInteraction,
        guild_id: &str,
        options: &[ResolvedOption<'_>],
    ) -> TallyResult<String> {
        if !self.is_admin(interaction) {
            return Ok("You are not allowed to delete a player, ask the admin!".to_string());
        }
        let Some((user, _)) = user_option(options, "member") else {
            return Ok("Could not delete player".to_string());
        };
        let player = self.service.player(&user.id.to_string(), guild_id).await?;
        self.service
            .remove_player(&player.discord_id, guild_id)
            .await?;
        self.boards.refresh(guild_id).await;
        Ok(format!("Deleted player {}", player.name))
    }

    fn is_admin(&self, interaction: &CommandInteraction) -> bool {
        interaction.user.id.to_string() == self.admin_user_id
    }
}

/// Registration payload for a resolved user option. The display name
/// prefers the guild nick, then the global name, then the account name.
fn new_player_from(user: &User, member: Option<&PartialMember>, guild_id: &str) -> NewPlayer {
    let name = member
        .and_then(|member| member.nick.clone())
        .or_else(|| user.global_name.clone())
        .unwrap_or_else(|| user.name.clone());
    NewPlayer::new(user.id.to_string(), user.name.as_str(), guild_id, name)
}

/// What the command sender gets to read when a handler fails. Ledger
/// rejections carry their own wording; everything else stays generic.
fn user_message(err: &TallyError) -> String {
    match err.kind() {
        TallyErrorKind::Ledger(inner) => inner.kind.to_string(),
        _ => "Something went wrong, try again later".to_string(),
    }
}

fn string_option<'a>(options: &'a [ResolvedOption<'a>], name: &str) -> Option<&'a str> {
    options
        .iter()
        .find(|option| option.name == name)
        .and_then(|option| match &option.value {
            ResolvedValue::String(value) => Some(*value),
            _ => None,
        })
}

fn integer_option(options: &[ResolvedOption<'_>], name: &str) -> Option<i64> {
    options
        .iter()
        .find(|option| option.name == name)
        .and_then(|option| match &option.value {
            ResolvedValue::Integer(value) => Some(*value),
            _ => None,
        })
}

fn user_option<'a>(
    options: &'a [ResolvedOption<'a>],
    name: &str,
) -> Option<(&'a User, Option<&'a PartialMember>)> {
    options
        .iter()
        .find(|option| option.name == name)
        .and_then(|option| match &option.value {
            ResolvedValue::User(user, member) => Some((*user, *member)),
            _ => None,
        })
}

fn channel_option<'a>(options: &'a [ResolvedOption<'a>], name: &str) -> Option<&'a PartialChannel> {
    options
        .iter()
        .find(|option| option.name == name)
        .and_then(|option| match &option.value {
            ResolvedValue::Channel(channel) => Some(*channel),
            _ => None,
        })
}
