//! Shared fixtures for interaction tests.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::command::services::CommandRegistry;
use crate::config::BotConfig;
use crate::interaction::{
    adapters::memory::InMemoryChatTransport,
    domain::{ChannelId, MessageHandle, MessageId, ReactionEvent, UserId},
    ports::{ChatTransport, TransportResult},
    services::{CommandContext, MenuHandler, MenuTermination, ReactionOutcome, ShutdownSignal},
};

pub(super) const OWNER: &str = "100";
pub(super) const ALICE: &str = "200";
pub(super) const BOB: &str = "300";
pub(super) const GENERAL: &str = "general";

pub(super) fn alice() -> UserId {
    UserId::new(ALICE)
}

pub(super) fn bob() -> UserId {
    UserId::new(BOB)
}

pub(super) fn general() -> ChannelId {
    ChannelId::new(GENERAL)
}

/// A human message in `channel`.
pub(super) fn user_message(channel: &ChannelId, author: &UserId, content: &str) -> MessageHandle {
    MessageHandle::new(MessageId::generate(), channel.clone(), author.clone(), content)
}

/// A context for a message Alice sent in `channel`.
pub(super) fn context_in(transport: &InMemoryChatTransport, channel: &ChannelId) -> CommandContext {
    CommandContext::new(
        Arc::new(transport.clone()),
        Arc::new(CommandRegistry::new()),
        Arc::new(BotConfig::new(UserId::new(OWNER))),
        ShutdownSignal::new(),
        user_message(channel, &alice(), "!quiz"),
        0,
    )
}

/// Records every reaction and counts finish calls.
#[derive(Debug, Default)]
pub(super) struct RecordingHandler {
    pub(super) seen: Vec<String>,
    pub(super) done_on: Option<String>,
    pub(super) finishes: Arc<AtomicUsize>,
    pub(super) last_termination: Option<String>,
}

impl RecordingHandler {
    pub(super) fn finishing_on(emoji: &str) -> Self {
        Self {
            done_on: Some(emoji.to_owned()),
            ..Self::default()
        }
    }

    pub(super) fn finish_count(&self) -> usize {
        self.finishes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MenuHandler for RecordingHandler {
    async fn on_reaction(
        &mut self,
        transport: &dyn ChatTransport,
        message: &MessageHandle,
        reaction: &ReactionEvent,
    ) -> TransportResult<ReactionOutcome> {
        self.seen.push(reaction.emoji.clone());
        transport
            .edit_message(message, &format!("picked {}", reaction.emoji))
            .await?;
        if self.done_on.as_deref() == Some(reaction.emoji.as_str()) {
            return Ok(ReactionOutcome::Done);
        }
        Ok(ReactionOutcome::Continue)
    }

    async fn on_finish(
        &mut self,
        _transport: &dyn ChatTransport,
        _message: &MessageHandle,
        termination: &MenuTermination,
    ) -> TransportResult<()> {
        self.finishes.fetch_add(1, Ordering::SeqCst);
        self.last_termination = Some(format!("{termination:?}"));
        Ok(())
    }
}
