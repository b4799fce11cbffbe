//! Shared world state for command dispatch BDD scenarios.

use async_trait::async_trait;
use mockable::DefaultClock;
use parley::command::{
    ports::{ActionResult, CommandAction},
    services::{CommandError, CommandRegistry, DispatchOutcome, Dispatcher},
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
pub const OWNER_ID: &str = "100";

/// Channel every scenario talks in.
pub const CHANNEL: &str = "general";

/// Records the values each invocation received.
#[derive(Debug, Clone, Default)]
pub struct RecordingAction {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl RecordingAction {
    /// Returns the values of the most recent invocation.
    #[must_use]
    pub fn last_call(&self) -> Option<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
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

/// Scenario world for command dispatch behaviour tests.
pub struct DispatchWorld {
    /// Transport recording everything the bot sends.
    pub transport: InMemoryChatTransport,
    /// Commands registered by given steps.
    pub registry: CommandRegistry,
    /// Action bound to every scenario command.
    pub recorder: RecordingAction,
    /// Dispatcher built on the first message.
    pub dispatcher: Option<Dispatcher<DefaultClock>>,
    /// Result of the most recent dispatch.
    pub last_outcome: Option<Result<DispatchOutcome, CommandError>>,
}

impl DispatchWorld {
    /// Creates a world with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transport: InMemoryChatTransport::default(),
            registry: CommandRegistry::new(),
            recorder: RecordingAction::default(),
            dispatcher: None,
            last_outcome: None,
        }
    }

    /// Returns the dispatcher, freezing the registry on first use.
    pub fn dispatcher(&mut self) -> &Dispatcher<DefaultClock> {
        self.dispatcher.get_or_insert_with(|| {
            Dispatcher::new(
                Arc::new(self.transport.clone()),
                std::mem::take(&mut self.registry),
                BotConfig::new(UserId::new(OWNER_ID)),
                DefaultClock,
            )
        })
    }

    /// Builds a message from the named user.
    #[must_use]
    pub fn message_from(user: &str, content: &str) -> MessageHandle {
        let author = if user == "owner" { OWNER_ID } else { user };
        MessageHandle::new(
            MessageId::generate(),
            ChannelId::new(CHANNEL),
            UserId::new(author),
            content,
        )
    }
}

impl Default for DispatchWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> DispatchWorld {
    DispatchWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
