//! Message and reaction values exchanged with the chat transport.

use serde::{Deserialize, Serialize};

use super::{ChannelId, MessageId, UserId};

/// A message as seen by the interpreter, inbound or outbound.
///
/// Handles are plain values: editing a message through the transport returns
/// a fresh handle rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHandle {
    id: MessageId,
    channel: ChannelId,
    author: UserId,
    author_is_bot: bool,
    content: String,
}

impl MessageHandle {
    /// Creates a message handle authored by a human user.
    #[must_use]
    pub fn new(
        id: MessageId,
        channel: ChannelId,
        author: UserId,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            channel,
            author,
            author_is_bot: false,
            content: content.into(),
        }
    }

    /// Marks the author as a bot account.
    #[must_use]
    pub const fn from_bot(mut self) -> Self {
        self.author_is_bot = true;
        self
    }

    /// Returns a copy of this handle with replaced content.
    #[must_use]
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }

    /// Returns the message identifier.
    #[must_use]
    pub const fn id(&self) -> &MessageId {
        &self.id
    }

    /// Returns the channel the message lives in.
    #[must_use]
    pub const fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Returns the author identifier.
    #[must_use]
    pub const fn author(&self) -> &UserId {
        &self.author
    }

    /// Returns `true` when the author is a bot account.
    #[must_use]
    pub const fn author_is_bot(&self) -> bool {
        self.author_is_bot
    }

    /// Returns the raw text content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// A reaction added by a user to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    /// Message the reaction was added to.
    pub message: MessageId,
    /// Emoji used for the reaction.
    pub emoji: String,
    /// User who reacted.
    pub user: UserId,
    /// Whether the reacting user is a bot account.
    pub user_is_bot: bool,
}

impl ReactionEvent {
    /// Creates a reaction event from a human user.
    #[must_use]
    pub fn new(message: MessageId, emoji: impl Into<String>, user: UserId) -> Self {
        Self {
            message,
            emoji: emoji.into(),
            user,
            user_is_bot: false,
        }
    }
}
