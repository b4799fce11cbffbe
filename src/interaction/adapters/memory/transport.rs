//! In-memory chat transport adapter.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::pin::pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::interaction::{
    domain::{ChannelId, MessageHandle, MessageId, ReactionEvent, UserId},
    ports::{ChatTransport, ReactionFilter, ReplyFilter, TransportError, TransportResult},
};

const DEFAULT_BOT_USER: &str = "parley-bot";

/// In-memory chat transport.
///
/// This adapter models a chat platform without any network connection.
/// Tests script inbound traffic with [`push_reply`](Self::push_reply) and
/// [`push_reaction`](Self::push_reaction) and inspect outbound traffic
/// afterwards. Scripted events are queued, so they may be pushed before the
/// interpreter starts waiting for them.
#[derive(Debug, Clone)]
pub struct InMemoryChatTransport {
    state: Arc<Mutex<TransportState>>,
    activity: Arc<Notify>,
}

#[derive(Debug)]
struct TransportState {
    bot_user: UserId,
    bots: HashSet<UserId>,
    direct_channels: HashSet<ChannelId>,
    reaction_forbidden: HashSet<ChannelId>,
    undeliverable: HashSet<ChannelId>,
    live: HashMap<MessageId, MessageHandle>,
    sent: Vec<MessageHandle>,
    deleted: Vec<MessageId>,
    reactions: HashMap<MessageId, Vec<String>>,
    removed_reactions: Vec<(MessageId, String, UserId)>,
    pending_replies: VecDeque<MessageHandle>,
    pending_reactions: VecDeque<ScriptedReaction>,
}

#[derive(Debug)]
struct ScriptedReaction {
    target: Option<MessageId>,
    emoji: String,
    user: UserId,
    user_is_bot: bool,
}

impl InMemoryChatTransport {
    /// Creates a transport whose own account is `bot_user`.
    #[must_use]
    pub fn new(bot_user: UserId) -> Self {
        let mut bots = HashSet::new();
        bots.insert(bot_user.clone());
        Self {
            state: Arc::new(Mutex::new(TransportState {
                bot_user,
                bots,
                direct_channels: HashSet::new(),
                reaction_forbidden: HashSet::new(),
                undeliverable: HashSet::new(),
                live: HashMap::new(),
                sent: Vec::new(),
                deleted: Vec::new(),
                reactions: HashMap::new(),
                removed_reactions: Vec::new(),
                pending_replies: VecDeque::new(),
                pending_reactions: VecDeque::new(),
            })),
            activity: Arc::new(Notify::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TransportState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the transport's own bot account.
    #[must_use]
    pub fn bot_user(&self) -> UserId {
        self.lock().bot_user.clone()
    }

    /// Returns the direct-message channel used for `user`.
    #[must_use]
    pub fn direct_channel(user: &UserId) -> ChannelId {
        ChannelId::new(format!("dm-{user}"))
    }

    /// Marks `channel` as a direct-message channel.
    pub fn mark_direct(&self, channel: ChannelId) {
        self.lock().direct_channels.insert(channel);
    }

    /// Makes every reaction operation in `channel` fail as forbidden.
    pub fn forbid_reactions(&self, channel: ChannelId) {
        self.lock().reaction_forbidden.insert(channel);
    }

    /// Makes every send to `channel` fail with a delivery error.
    pub fn fail_deliveries(&self, channel: ChannelId) {
        self.lock().undeliverable.insert(channel);
    }

    /// Registers an additional bot account.
    pub fn register_bot(&self, user: UserId) {
        self.lock().bots.insert(user);
    }

    /// Queues an inbound user message for [`ChatTransport::await_reply`].
    pub fn push_reply(&self, message: MessageHandle) {
        self.lock().pending_replies.push_back(message);
        self.activity.notify_waiters();
    }

    /// Queues a reaction delivered to whichever message waits next.
    pub fn push_reaction(&self, emoji: impl Into<String>, user: UserId) {
        self.push_scripted(None, emoji.into(), user);
    }

    /// Queues a reaction delivered to a specific message.
    pub fn push_reaction_on(&self, message: MessageId, emoji: impl Into<String>, user: UserId) {
        self.push_scripted(Some(message), emoji.into(), user);
    }

    fn push_scripted(&self, target: Option<MessageId>, emoji: String, user: UserId) {
        let mut state = self.lock();
        let user_is_bot = state.bots.contains(&user);
        state.pending_reactions.push_back(ScriptedReaction {
            target,
            emoji,
            user,
            user_is_bot,
        });
        drop(state);
        self.activity.notify_waiters();
    }

    /// Returns every message sent through the transport, in send order, with
    /// the content it had when sent.
    #[must_use]
    pub fn sent_messages(&self) -> Vec<MessageHandle> {
        self.lock().sent.clone()
    }

    /// Returns the contents sent to `channel`, in send order.
    #[must_use]
    pub fn sent_contents(&self, channel: &ChannelId) -> Vec<String> {
        self.lock()
            .sent
            .iter()
            .filter(|message| message.channel() == channel)
            .map(|message| message.content().to_owned())
            .collect()
    }

    /// Returns the current state of a live (not deleted) message.
    #[must_use]
    pub fn message(&self, id: &MessageId) -> Option<MessageHandle> {
        self.lock().live.get(id).cloned()
    }

    /// Returns identifiers of deleted messages, in deletion order.
    #[must_use]
    pub fn deleted_messages(&self) -> Vec<MessageId> {
        self.lock().deleted.clone()
    }

    /// Returns the reactions currently applied by the bot to a message.
    #[must_use]
    pub fn reactions_on(&self, id: &MessageId) -> Vec<String> {
        self.lock().reactions.get(id).cloned().unwrap_or_default()
    }

    /// Returns the user reactions removed so far as `(message, emoji, user)`.
    #[must_use]
    pub fn removed_reactions(&self) -> Vec<(MessageId, String, UserId)> {
        self.lock().removed_reactions.clone()
    }

    fn take_reply(&self, channel: &ChannelId, filter: ReplyFilter<'_>) -> Option<MessageHandle> {
        let mut state = self.lock();
        let position = state
            .pending_replies
            .iter()
            .position(|message| message.channel() == channel && filter(message))?;
        let reply = state.pending_replies.remove(position)?;
        state.live.insert(reply.id().clone(), reply.clone());
        Some(reply)
    }

    /// Delivers queued reactions to `message` until one passes `filter`.
    ///
    /// Rejected reactions are consumed: the platform saw them and the waiter
    /// ignored them.
    fn take_reaction(
        &self,
        message: &MessageHandle,
        filter: ReactionFilter<'_>,
    ) -> Option<ReactionEvent> {
        let mut state = self.lock();
        while let Some(position) = state.pending_reactions.iter().position(|scripted| {
            scripted
                .target
                .as_ref()
                .is_none_or(|target| target == message.id())
        }) {
            let scripted = state.pending_reactions.remove(position)?;
            let event = ReactionEvent {
                message: message.id().clone(),
                emoji: scripted.emoji,
                user: scripted.user,
                user_is_bot: scripted.user_is_bot,
            };
            if filter(&event) {
                return Some(event);
            }
            tracing::debug!(
                message = %message.id(),
                emoji = %event.emoji,
                user = %event.user,
                "reaction ignored by filter"
            );
        }
        None
    }

    fn ensure_reactions_allowed(&self, message: &MessageHandle) -> TransportResult<()> {
        if self.lock().reaction_forbidden.contains(message.channel()) {
            return Err(TransportError::Forbidden {
                channel: message.channel().clone(),
                reason: "reactions are not permitted here".to_owned(),
            });
        }
        Ok(())
    }
}

impl Default for InMemoryChatTransport {
    fn default() -> Self {
        Self::new(UserId::new(DEFAULT_BOT_USER))
    }
}

#[async_trait]
impl ChatTransport for InMemoryChatTransport {
    async fn send_message(
        &self,
        channel: &ChannelId,
        content: &str,
    ) -> TransportResult<MessageHandle> {
        let mut state = self.lock();
        if state.undeliverable.contains(channel) {
            return Err(TransportError::Delivery {
                channel: channel.clone(),
                reason: "channel rejected the message".to_owned(),
            });
        }
        let message = MessageHandle::new(
            MessageId::generate(),
            channel.clone(),
            state.bot_user.clone(),
            content,
        )
        .from_bot();
        state.live.insert(message.id().clone(), message.clone());
        state.sent.push(message.clone());
        Ok(message)
    }

    async fn send_direct_message(
        &self,
        user: &UserId,
        content: &str,
    ) -> TransportResult<MessageHandle> {
        let channel = Self::direct_channel(user);
        self.mark_direct(channel.clone());
        self.send_message(&channel, content).await
    }

    async fn edit_message(
        &self,
        message: &MessageHandle,
        content: &str,
    ) -> TransportResult<MessageHandle> {
        let mut state = self.lock();
        let stored = state
            .live
            .get_mut(message.id())
            .ok_or_else(|| TransportError::MessageNotFound(message.id().clone()))?;
        *stored = stored.with_content(content);
        Ok(stored.clone())
    }

    async fn delete_message(&self, message: &MessageHandle) -> TransportResult<()> {
        let mut state = self.lock();
        if state.live.remove(message.id()).is_none() {
            return Err(TransportError::MessageNotFound(message.id().clone()));
        }
        state.reactions.remove(message.id());
        state.deleted.push(message.id().clone());
        Ok(())
    }

    async fn await_reply(
        &self,
        channel: &ChannelId,
        filter: ReplyFilter<'_>,
        timeout: Duration,
    ) -> TransportResult<Option<MessageHandle>> {
        let deadline = Instant::now() + timeout;
        loop {
            let mut notified = pin!(self.activity.notified());
            notified.as_mut().enable();
            if let Some(reply) = self.take_reply(channel, filter) {
                return Ok(Some(reply));
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(None);
            }
        }
    }

    async fn clear_reactions(&self, message: &MessageHandle) -> TransportResult<()> {
        self.ensure_reactions_allowed(message)?;
        self.lock().reactions.remove(message.id());
        Ok(())
    }

    async fn set_reactions(
        &self,
        message: &MessageHandle,
        emojis: &[String],
    ) -> TransportResult<()> {
        self.ensure_reactions_allowed(message)?;
        let mut state = self.lock();
        if !state.live.contains_key(message.id()) {
            return Err(TransportError::MessageNotFound(message.id().clone()));
        }
        let applied = state.reactions.entry(message.id().clone()).or_default();
        for emoji in emojis {
            if !applied.contains(emoji) {
                applied.push(emoji.clone());
            }
        }
        Ok(())
    }

    async fn await_reaction(
        &self,
        message: &MessageHandle,
        filter: ReactionFilter<'_>,
        timeout: Duration,
    ) -> TransportResult<Option<ReactionEvent>> {
        let deadline = Instant::now() + timeout;
        loop {
            let mut notified = pin!(self.activity.notified());
            notified.as_mut().enable();
            if let Some(event) = self.take_reaction(message, filter) {
                return Ok(Some(event));
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(None);
            }
        }
    }

    async fn remove_reaction(
        &self,
        message: &MessageHandle,
        emoji: &str,
        user: &UserId,
    ) -> TransportResult<()> {
        self.ensure_reactions_allowed(message)?;
        self.lock().removed_reactions.push((
            message.id().clone(),
            emoji.to_owned(),
            user.clone(),
        ));
        Ok(())
    }

    async fn is_direct_message(&self, channel: &ChannelId) -> TransportResult<bool> {
        Ok(self.lock().direct_channels.contains(channel))
    }

    async fn is_bot(&self, user: &UserId) -> TransportResult<bool> {
        Ok(self.lock().bots.contains(user))
    }
}
