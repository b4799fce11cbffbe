//! Shared test helpers for in-memory integration tests.

use async_trait::async_trait;
use mockable::DefaultClock;
use parley::command::{
    ports::{ActionResult, CommandAction},
    services::{CommandRegistry, Dispatcher},
};
use parley::config::BotConfig;
use parley::interaction::{
    adapters::memory::InMemoryChatTransport,
    domain::{ChannelId, MessageHandle, MessageId, UserId},
    services::CommandContext,
};
use rstest::fixture;
use std::sync::{Arc, Mutex, PoisonError};

/// Account configured as the bot owner.
pub const OWNER: &str = "100";
/// A regular user.
pub const ALICE: &str = "200";
/// Another regular user.
pub const BOB: &str = "300";
/// The channel most tests talk in.
pub const GENERAL: &str = "general";

/// Provides a fresh in-memory transport for each test.
#[fixture]
pub fn transport() -> InMemoryChatTransport {
    InMemoryChatTransport::default()
}

/// Builds a human message.
#[must_use]
pub fn message(author: &str, channel: &str, content: &str) -> MessageHandle {
    MessageHandle::new(
        MessageId::generate(),
        ChannelId::new(channel),
        UserId::new(author),
        content,
    )
}

/// Returns the general channel.
#[must_use]
pub fn general() -> ChannelId {
    ChannelId::new(GENERAL)
}

/// Returns the default configuration for tests.
#[must_use]
pub fn config() -> BotConfig {
    BotConfig::new(UserId::new(OWNER))
}

/// Builds a dispatcher over `transport` and `registry`.
#[must_use]
pub fn bot(transport: &InMemoryChatTransport, registry: CommandRegistry) -> Dispatcher<DefaultClock> {
    Dispatcher::new(Arc::new(transport.clone()), registry, config(), DefaultClock)
}

/// Records the values each invocation received.
#[derive(Debug, Clone, Default)]
pub struct RecordingAction {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl RecordingAction {
    /// Returns every recorded invocation.
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CommandAction for RecordingAction {
    async fn run(&self, _context: &CommandContext, arguments: Vec<String>) -> ActionResult<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(arguments);
        Ok(())
    }
}
