//! Inbound gateway events, normalized into one tagged union.
//!
//! The bot's platform adapter translates raw gateway payloads into these
//! values before any routing happens, so the dispatcher and the workflows
//! behind it never see a platform type.

use serde::{Deserialize, Serialize};

/// Everything the dispatcher can receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayEvent {
    /// A reaction was added to a message in a guild
    ReactionAdded(ReactionEvent),
    /// A reaction was removed from a message in a guild
    ReactionRemoved(ReactionEvent),
    /// A button was pressed
    ComponentPressed(ComponentEvent),
    /// A select menu option was chosen
    OptionSelected(SelectEvent),
}

/// A reaction added to or removed from a guild message.
///
/// Removal payloads carry no member data, so the name fields are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    /// Guild the message lives in
    pub guild_id: String,
    /// Channel the message lives in
    pub channel_id: String,
    /// The reacted-to message
    pub message_id: String,
    /// The reacting user
    pub user_id: String,
    /// The user's account name, when the payload includes the member
    pub user_name: Option<String>,
    /// The user's display name, when the payload includes the member
    pub display_name: Option<String>,
    /// The emoji, as its unicode string
    pub emoji: String,
}

/// A button press on a message component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEvent {
    /// Guild the component lives in
    pub guild_id: String,
    /// The pressing user
    pub user_id: String,
    /// The component's custom id
    pub custom_id: String,
    /// Handle for answering the interaction
    pub interaction: InteractionHandle,
}

/// A selection made in a select menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectEvent {
    /// Guild the menu lives in
    pub guild_id: String,
    /// The selecting user
    pub user_id: String,
    /// The menu's custom id
    pub custom_id: String,
    /// Chosen option values
    pub values: Vec<String>,
    /// Handle for answering the interaction
    pub interaction: InteractionHandle,
}

/// What the platform needs to answer an interaction: its id and its
/// single-use token. Tokens stay valid for fifteen minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct InteractionHandle {
    /// Interaction id
    pub id: u64,
    /// Interaction token
    #[new(into)]
    pub token: String,
}
