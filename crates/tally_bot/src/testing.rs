//! Recording messenger for workflow tests.

use crate::messenger::{ConfirmPrompt, Messenger};
use crate::render::BoardView;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tally_error::{GatewayError, GatewayErrorKind, TallyResult};
use tally_models::InteractionHandle;

/// One recorded outbound operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    PostRegistration {
        channel_id: String,
    },
    PostBoard {
        channel_id: String,
        rows: Vec<(String, i64)>,
    },
    EditBoard {
        channel_id: String,
        message_id: String,
        rows: Vec<(String, i64)>,
    },
    DeleteMessage {
        channel_id: String,
        message_id: String,
    },
    SendPrompt {
        interaction_token: String,
        text: String,
        user_id: String,
        token: String,
    },
    RespondEphemeral {
        interaction_token: String,
        content: String,
    },
    Acknowledge {
        interaction_token: String,
    },
    DismissPrompt {
        interaction_token: String,
    },
}

/// A [`Messenger`] that records every call and can be told to fail
/// deletions or edits.
#[derive(Default)]
pub(crate) struct RecordingMessenger {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicU64,
    fail_deletes: bool,
    fail_edits: bool,
}

impl RecordingMessenger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_edits() -> Self {
        Self {
            fail_edits: true,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn next_message_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn rows(board: &BoardView) -> Vec<(String, i64)> {
        board
            .rows
            .iter()
            .map(|row| (row.name.clone(), row.amount))
            .collect()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn post_registration_prompt(&self, channel_id: &str) -> TallyResult<String> {
        self.record(Call::PostRegistration {
            channel_id: channel_id.to_string(),
        });
        Ok(self.next_message_id("reg"))
    }

    async fn post_board(&self, channel_id: &str, board: &BoardView) -> TallyResult<String> {
        self.record(Call::PostBoard {
            channel_id: channel_id.to_string(),
            rows: Self::rows(board),
        });
        Ok(self.next_message_id("board"))
    }

    async fn edit_board(
        &self,
        channel_id: &str,
        message_id: &str,
        board: &BoardView,
    ) -> TallyResult<()> {
        self.record(Call::EditBoard {
            channel_id: channel_id.to_string(),
            message_id: message_id.to_string(),
            rows: Self::rows(board),
        });
        if self.fail_edits {
            return Err(
                GatewayError::new(GatewayErrorKind::Request("edit rejected".to_string())).into(),
            );
        }
        Ok(())
    }

    async fn delete_message(&self, channel_id: &str, message_id: &str) -> TallyResult<()> {
        self.record(Call::DeleteMessage {
            channel_id: channel_id.to_string(),
            message_id: message_id.to_string(),
        });
        if self.fail_deletes {
            return Err(GatewayError::new(GatewayErrorKind::Request(
                "delete rejected".to_string(),
            ))
            .into());
        }
        Ok(())
    }

    async fn send_prompt(
        &self,
        interaction: &InteractionHandle,
        prompt: &ConfirmPrompt,
    ) -> TallyResult<()> {
        self.record(Call::SendPrompt {
            interaction_token: interaction.token.clone(),
            text: prompt.text.clone(),
            user_id: prompt.user_id.clone(),
            token: prompt.token.clone(),
        });
        Ok(())
    }

    async fn respond_ephemeral(
        &self,
        interaction: &InteractionHandle,
        content: &str,
    ) -> TallyResult<()> {
        self.record(Call::RespondEphemeral {
            interaction_token: interaction.token.clone(),
            content: content.to_string(),
        });
        Ok(())
    }

    async fn acknowledge(&self, interaction: &InteractionHandle) -> TallyResult<()> {
        self.record(Call::Acknowledge {
            interaction_token: interaction.token.clone(),
        });
        Ok(())
    }

    async fn dismiss_prompt(&self, interaction_token: &str) -> TallyResult<()> {
        self.record(Call::DismissPrompt {
            interaction_token: interaction_token.to_string(),
        });
        Ok(())
    }
}
