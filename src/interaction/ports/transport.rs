//! Chat transport port.
//!
//! The interpreter never talks to a chat platform directly. Everything it
//! needs (sending, editing, waiting for replies and reactions) goes through
//! [`ChatTransport`].

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::interaction::domain::{ChannelId, MessageHandle, MessageId, ReactionEvent, UserId};

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Predicate applied to candidate replies while waiting.
pub type ReplyFilter<'a> = &'a (dyn Fn(&MessageHandle) -> bool + Send + Sync);

/// Predicate applied to candidate reactions while waiting.
pub type ReactionFilter<'a> = &'a (dyn Fn(&ReactionEvent) -> bool + Send + Sync);

/// Capability contract for a chat platform connection.
///
/// Waiting operations return `Ok(None)` when their timeout elapses. A timeout
/// is a normal outcome, not an error.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends a message to a channel.
    async fn send_message(
        &self,
        channel: &ChannelId,
        content: &str,
    ) -> TransportResult<MessageHandle>;

    /// Sends a private message to a user.
    async fn send_direct_message(
        &self,
        user: &UserId,
        content: &str,
    ) -> TransportResult<MessageHandle>;

    /// Replaces the content of a previously sent message.
    async fn edit_message(
        &self,
        message: &MessageHandle,
        content: &str,
    ) -> TransportResult<MessageHandle>;

    /// Deletes a message.
    async fn delete_message(&self, message: &MessageHandle) -> TransportResult<()>;

    /// Waits for the next message in `channel` accepted by `filter`.
    async fn await_reply(
        &self,
        channel: &ChannelId,
        filter: ReplyFilter<'_>,
        timeout: Duration,
    ) -> TransportResult<Option<MessageHandle>>;

    /// Removes every reaction from a message.
    async fn clear_reactions(&self, message: &MessageHandle) -> TransportResult<()>;

    /// Adds the given emoji as reactions on a message, in order.
    async fn set_reactions(
        &self,
        message: &MessageHandle,
        emojis: &[String],
    ) -> TransportResult<()>;

    /// Waits for the next reaction on `message` accepted by `filter`.
    async fn await_reaction(
        &self,
        message: &MessageHandle,
        filter: ReactionFilter<'_>,
        timeout: Duration,
    ) -> TransportResult<Option<ReactionEvent>>;

    /// Removes a single user's reaction from a message.
    async fn remove_reaction(
        &self,
        message: &MessageHandle,
        emoji: &str,
        user: &UserId,
    ) -> TransportResult<()>;

    /// Returns `true` when `channel` is a direct-message channel.
    async fn is_direct_message(&self, channel: &ChannelId) -> TransportResult<bool>;

    /// Returns `true` when `user` is a bot account.
    async fn is_bot(&self, user: &UserId) -> TransportResult<bool>;
}

/// Errors surfaced by transport adapters.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// A message could not be delivered to a channel.
    #[error("failed to deliver message to channel {channel}: {reason}")]
    Delivery {
        /// Target channel.
        channel: ChannelId,
        /// Adapter-provided reason.
        reason: String,
    },

    /// The referenced message does not exist (or no longer exists).
    #[error("message {0} was not found")]
    MessageNotFound(MessageId),

    /// The operation is not permitted in the message's context.
    #[error("operation not permitted in channel {channel}: {reason}")]
    Forbidden {
        /// Channel where the operation was attempted.
        channel: ChannelId,
        /// Adapter-provided reason.
        reason: String,
    },

    /// Generic adapter failure.
    #[error("chat transport error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Wraps an adapter runtime error.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
