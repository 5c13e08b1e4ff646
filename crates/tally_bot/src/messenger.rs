//! Outbound chat operations.
//!
//! Every message the bot sends, edits, or deletes goes through the
//! [`Messenger`] trait, so the workflows stay testable and the serenity
//! client stays in one place. The production implementation wraps the
//! serenity HTTP client with a bounded timeout per call.

use crate::render::{self, BoardView};
use async_trait::async_trait;
use serenity::builder::{
    CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage, EditMessage,
};
use serenity::http::Http;
use serenity::model::id::{ChannelId, InteractionId, MessageId};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tally_error::{GatewayError, GatewayErrorKind, TallyResult};
use tally_models::InteractionHandle;
use tracing::instrument;

/// An ephemeral charge prompt: the question plus the two buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    /// The question shown to the pressing user
    pub text: String,
    /// Target user id, embedded into the button custom ids
    pub user_id: String,
    /// Single-use confirmation token, embedded into the button custom ids
    pub token: String,
}

/// Outbound chat surface used by the workflows.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Post the registration prompt. Returns the new message id.
    async fn post_registration_prompt(&self, channel_id: &str) -> TallyResult<String>;

    /// Post the debt board. Returns the new message id.
    async fn post_board(&self, channel_id: &str, board: &BoardView) -> TallyResult<String>;

    /// Re-render the debt board in place.
    async fn edit_board(
        &self,
        channel_id: &str,
        message_id: &str,
        board: &BoardView,
    ) -> TallyResult<()>;

    /// Delete one message.
    async fn delete_message(&self, channel_id: &str, message_id: &str) -> TallyResult<()>;

    /// Answer an interaction with an ephemeral charge prompt.
    async fn send_prompt(
        &self,
        interaction: &InteractionHandle,
        prompt: &ConfirmPrompt,
    ) -> TallyResult<()>;

    /// Answer an interaction with a plain ephemeral message.
    async fn respond_ephemeral(
        &self,
        interaction: &InteractionHandle,
        content: &str,
    ) -> TallyResult<()>;

    /// Acknowledge a component interaction without changing anything.
    async fn acknowledge(&self, interaction: &InteractionHandle) -> TallyResult<()>;

    /// Delete the ephemeral prompt a stored interaction token points at.
    async fn dismiss_prompt(&self, interaction_token: &str) -> TallyResult<()>;
}

/// Deadline for every Discord HTTP call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// [`Messenger`] over the serenity HTTP client.
pub struct SerenityMessenger {
    http: Arc<Http>,
    timeout: Duration,
}

impl SerenityMessenger {
    /// Wrap an HTTP client with the default timeout.
    pub fn new(http: Arc<Http>) -> Self {
        Self {
            http,
            timeout: REQUEST_TIMEOUT,
        }
    }

    async fn bounded<T>(
        &self,
        what: &'static str,
        call: impl Future<Output = serenity::Result<T>> + Send,
    ) -> TallyResult<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(GatewayError::new(GatewayErrorKind::Request(format!(
                "{what}: {err}"
            )))
            .into()),
            Err(_) => Err(GatewayError::new(GatewayErrorKind::Timeout(what.to_string())).into()),
        }
    }
}

fn parse_snowflake(raw: &str) -> Result<u64, GatewayError> {
    match raw.parse::<u64>() {
        Ok(id) if id != 0 => Ok(id),
        _ => Err(GatewayError::new(GatewayErrorKind::MalformedId(
            raw.to_string(),
        ))),
    }
}

fn channel(raw: &str) -> Result<ChannelId, GatewayError> {
    Ok(ChannelId::new(parse_snowflake(raw)?))
}

fn message(raw: &str) -> Result<MessageId, GatewayError> {
    Ok(MessageId::new(parse_snowflake(raw)?))
}

#[async_trait]
impl Messenger for SerenityMessenger {
    #[instrument(skip(self))]
    async fn post_registration_prompt(&self, channel_id: &str) -> TallyResult<String> {
        let channel = channel(channel_id)?;
        let builder = CreateMessage::new().content(render::REGISTRATION_PROMPT);
        let message = self
            .bounded(
                "post registration prompt",
                channel.send_message(&self.http, builder),
            )
            .await?;
        Ok(message.id.to_string())
    }

    #[instrument(skip(self, board))]
    async fn post_board(&self, channel_id: &str, board: &BoardView) -> TallyResult<String> {
        let channel = channel(channel_id)?;
        let builder = CreateMessage::new()
            .embed(render::board_embed(board))
            .components(render::board_components(board));
        let message = self
            .bounded("post board", channel.send_message(&self.http, builder))
            .await?;
        Ok(message.id.to_string())
    }

    #[instrument(skip(self, board))]
    async fn edit_board(
        &self,
        channel_id: &str,
        message_id: &str,
        board: &BoardView,
    ) -> TallyResult<()> {
        let channel = channel(channel_id)?;
        let message = message(message_id)?;
        let builder = EditMessage::new()
            .embed(render::board_embed(board))
            .components(render::board_components(board));
        self.bounded(
            "edit board",
            channel.edit_message(&self.http, message, builder),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_message(&self, channel_id: &str, message_id: &str) -> TallyResult<()> {
        let channel = channel(channel_id)?;
        let message = message(message_id)?;
        self.bounded(
            "delete message",
            channel.delete_message(&self.http, message),
        )
        .await
    }

    #[instrument(skip(self, prompt))]
    async fn send_prompt(
        &self,
        interaction: &InteractionHandle,
        prompt: &ConfirmPrompt,
    ) -> TallyResult<()> {
        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(prompt.text.as_str())
                .components(render::confirm_components(&prompt.user_id, &prompt.token))
                .ephemeral(true),
        );
        self.bounded(
            "send prompt",
            self.http.create_interaction_response(
                InteractionId::new(interaction.id),
                &interaction.token,
                &response,
                Vec::new(),
            ),
        )
        .await
    }

    #[instrument(skip(self, content))]
    async fn respond_ephemeral(
        &self,
        interaction: &InteractionHandle,
        content: &str,
    ) -> TallyResult<()> {
        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(content)
                .ephemeral(true),
        );
        self.bounded(
            "respond ephemeral",
            self.http.create_interaction_response(
                InteractionId::new(interaction.id),
                &interaction.token,
                &response,
                Vec::new(),
            ),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn acknowledge(&self, interaction: &InteractionHandle) -> TallyResult<()> {
        self.bounded(
            "acknowledge",
            self.http.create_interaction_response(
                InteractionId::new(interaction.id),
                &interaction.token,
                &CreateInteractionResponse::Acknowledge,
                Vec::new(),
            ),
        )
        .await
    }

    #[instrument(skip(self, interaction_token))]
    async fn dismiss_prompt(&self, interaction_token: &str) -> TallyResult<()> {
        self.bounded(
            "dismiss prompt",
            self.http
                .delete_original_interaction_response(interaction_token),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snowflakes_must_be_nonzero_decimal() {
        assert_eq!(parse_snowflake("263352209654153236").unwrap(), 263352209654153236);
        for raw in ["", "0", "-1", "abc", "12x"] {
            assert!(parse_snowflake(raw).is_err(), "{raw:?} should not parse");
        }
    }
}
