//! Per-invocation context handed to command actions.
//!
//! A [`CommandContext`] wraps the transport and the triggering message. It is
//! built once per incoming event and never mutates the transport's own
//! objects.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::command::services::CommandRegistry;
use crate::config::BotConfig;
use crate::interaction::{
    domain::{ChannelId, MessageHandle, ReactionEvent, UserId},
    ports::{ChatTransport, TransportResult},
    services::reaction_menu::{
        MenuError, MenuHandler, ReactionMenu, ReactionMenuOptions, ReactionOutcome,
    },
};

/// Predicate applied to replies awaited by a prompt.
pub type PromptFilter = Arc<dyn Fn(&MessageHandle) -> bool + Send + Sync>;

/// Options for [`CommandContext::prompt`] and [`CommandContext::await_reply`].
#[derive(Clone, Default)]
pub struct PromptOptions {
    timeout: Option<Duration>,
    filter: Option<PromptFilter>,
}

impl PromptOptions {
    /// Creates options that use the configured prompt timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the time to wait for a reply.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds a predicate the reply must satisfy.
    #[must_use]
    pub fn with_filter(
        mut self,
        filter: impl Fn(&MessageHandle) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }
}

impl fmt::Debug for PromptOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptOptions")
            .field("timeout", &self.timeout)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Options for [`CommandContext::prompt_reaction`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReactionPromptOptions {
    /// Accept the reaction of any non-bot user, not just the invoker.
    pub allow_anyone: bool,
    /// Overrides the configured menu timeout.
    pub timeout: Option<Duration>,
}

/// Handle used to request a graceful shutdown of the bot.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Creates a signal that has not been triggered.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Requests shutdown. Idempotent.
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    /// Returns `true` once shutdown has been requested.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }

    /// Subscribes to shutdown requests.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrapper around one incoming message and the services that handle it.
#[derive(Clone)]
pub struct CommandContext {
    transport: Arc<dyn ChatTransport>,
    registry: Arc<CommandRegistry>,
    config: Arc<BotConfig>,
    shutdown: ShutdownSignal,
    message: MessageHandle,
    invoked_at_ms: i64,
}

impl CommandContext {
    /// Creates a context for `message`.
    #[must_use]
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        registry: Arc<CommandRegistry>,
        config: Arc<BotConfig>,
        shutdown: ShutdownSignal,
        message: MessageHandle,
        invoked_at_ms: i64,
    ) -> Self {
        Self {
            transport,
            registry,
            config,
            shutdown,
            message,
            invoked_at_ms,
        }
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &Arc<dyn ChatTransport> {
        &self.transport
    }

    /// Returns the command registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Returns the bot configuration.
    #[must_use]
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Returns the shutdown signal.
    #[must_use]
    pub const fn shutdown(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    /// Returns the message that triggered the invocation.
    #[must_use]
    pub const fn message(&self) -> &MessageHandle {
        &self.message
    }

    /// Returns the invoking user.
    #[must_use]
    pub const fn author(&self) -> &UserId {
        self.message.author()
    }

    /// Returns the channel the invocation came from.
    #[must_use]
    pub const fn channel(&self) -> &ChannelId {
        self.message.channel()
    }

    /// Returns the dispatch timestamp in milliseconds since the Unix epoch.
    #[must_use]
    pub const fn invoked_at_ms(&self) -> i64 {
        self.invoked_at_ms
    }

    /// Returns `true` when the invoker is the configured owner.
    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.config.owner() == self.author()
    }

    /// Sends `content` to the invocation channel.
    ///
    /// # Errors
    ///
    /// Returns the transport error when delivery fails.
    pub async fn say(&self, content: &str) -> TransportResult<MessageHandle> {
        self.transport.send_message(self.channel(), content).await
    }

    /// Waits for the invoker's next message in the invocation channel.
    ///
    /// Returns `Ok(None)` when the wait times out.
    ///
    /// # Errors
    ///
    /// Returns the transport error when waiting fails.
    pub async fn await_reply(
        &self,
        options: &PromptOptions,
    ) -> TransportResult<Option<MessageHandle>> {
        let author = self.author().clone();
        let accepts = |reply: &MessageHandle| {
            reply.author() == &author
                && !reply.author_is_bot()
                && options.filter.as_ref().is_none_or(|filter| filter(reply))
        };
        let timeout = options.timeout.unwrap_or_else(|| self.config.prompt_timeout());
        self.transport
            .await_reply(self.channel(), &accepts, timeout)
            .await
    }

    /// Sends `content` and returns the text of the invoker's answer.
    ///
    /// Returns `Ok(None)` when no answer arrives in time.
    ///
    /// # Errors
    ///
    /// Returns the transport error when sending or waiting fails.
    pub async fn prompt(
        &self,
        content: &str,
        options: &PromptOptions,
    ) -> TransportResult<Option<String>> {
        self.say(content).await?;
        let reply = self.await_reply(options).await?;
        Ok(reply.map(|message| message.content().to_owned()))
    }

    /// Returns menu options seeded with the configured menu timeout.
    #[must_use]
    pub fn menu_options(&self) -> ReactionMenuOptions {
        ReactionMenuOptions::new().with_timeout(self.config.menu_timeout())
    }

    /// Creates a reaction menu on `message` without starting it.
    #[must_use]
    pub fn create_menu<H>(
        &self,
        message: MessageHandle,
        emojis: impl IntoIterator<Item = impl Into<String>>,
        handler: H,
        options: ReactionMenuOptions,
    ) -> ReactionMenu<H>
    where
        H: MenuHandler,
    {
        ReactionMenu::new(Arc::clone(&self.transport), message, emojis, handler, options)
    }

    /// Sends `content` and waits for a single reaction among `emojis`.
    ///
    /// Only the invoker's reaction counts unless
    /// [`ReactionPromptOptions::allow_anyone`] is set. Returns `Ok(None)`
    /// when nobody reacts in time.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::DirectMessage`] in direct-message channels and
    /// other [`MenuError`] variants when the transport fails.
    pub async fn prompt_reaction(
        &self,
        content: &str,
        emojis: &[&str],
        options: ReactionPromptOptions,
    ) -> Result<Option<String>, MenuError> {
        let is_direct = self
            .transport
            .is_direct_message(self.channel())
            .await
            .map_err(MenuError::Start)?;
        if is_direct {
            return Err(MenuError::DirectMessage(self.channel().clone()));
        }

        let message = self.say(content).await.map_err(MenuError::Start)?;
        let mut menu_options = self.menu_options().with_max_total_reactions(1);
        if let Some(timeout) = options.timeout {
            menu_options = menu_options.with_timeout(timeout);
        }
        if !options.allow_anyone {
            let invoker = self.author().clone();
            menu_options = menu_options.with_filter(move |event| event.user == invoker);
        }

        let report = self
            .create_menu(
                message,
                emojis.iter().copied(),
                ChoiceCapture::default(),
                menu_options,
            )
            .run()
            .await?;
        Ok(report.handler.choice)
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("message", &self.message)
            .field("invoked_at_ms", &self.invoked_at_ms)
            .finish_non_exhaustive()
    }
}

/// Records the first reaction a one-round menu receives.
#[derive(Debug, Default)]
struct ChoiceCapture {
    choice: Option<String>,
}

#[async_trait]
impl MenuHandler for ChoiceCapture {
    async fn on_reaction(
        &mut self,
        _transport: &dyn ChatTransport,
        _message: &MessageHandle,
        reaction: &ReactionEvent,
    ) -> TransportResult<ReactionOutcome> {
        self.choice = Some(reaction.emoji.clone());
        Ok(ReactionOutcome::Done)
    }
}
