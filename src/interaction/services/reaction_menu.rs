//! Reaction-driven menu bound to a single message.
//!
//! A menu runs a bounded sequence of rounds. Each round resets the reactions
//! on its message, waits for one qualifying reaction and hands it to a
//! [`MenuHandler`]. The handler's `on_finish` runs exactly once when the menu
//! terminates, whatever the cause.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::interaction::{
    domain::{ChannelId, MessageHandle, ReactionEvent},
    ports::{ChatTransport, TransportError, TransportResult},
};

/// Default time a menu waits for each reaction.
pub const DEFAULT_MENU_TIMEOUT: Duration = Duration::from_secs(60);

/// Extra predicate a reaction must satisfy to count as a round.
pub type MenuFilter = Arc<dyn Fn(&ReactionEvent) -> bool + Send + Sync>;

/// What a handler wants after processing a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOutcome {
    /// Keep the menu open for another round.
    Continue,
    /// Close the menu.
    Done,
}

/// Why a menu terminated.
#[derive(Debug, Clone)]
pub enum MenuTermination {
    /// The handler reported [`ReactionOutcome::Done`].
    Completed,
    /// The configured number of rounds was used up.
    RoundBudgetExhausted,
    /// No qualifying reaction arrived before the timeout.
    TimedOut,
    /// A transport operation failed.
    Failed(TransportError),
}

/// Callbacks driven by a [`ReactionMenu`].
#[async_trait]
pub trait MenuHandler: Send {
    /// Handles one qualifying reaction.
    ///
    /// # Errors
    ///
    /// Returning an error terminates the menu with
    /// [`MenuTermination::Failed`].
    async fn on_reaction(
        &mut self,
        transport: &dyn ChatTransport,
        message: &MessageHandle,
        reaction: &ReactionEvent,
    ) -> TransportResult<ReactionOutcome>;

    /// Runs once when the menu terminates.
    ///
    /// # Errors
    ///
    /// Errors are reported by [`ReactionMenu::run`] as
    /// [`MenuError::Finish`].
    async fn on_finish(
        &mut self,
        transport: &dyn ChatTransport,
        message: &MessageHandle,
        termination: &MenuTermination,
    ) -> TransportResult<()> {
        let _ = (transport, message, termination);
        Ok(())
    }
}

/// Errors returned by [`ReactionMenu::run`].
#[derive(Debug, Clone, Error)]
pub enum MenuError {
    /// The menu could not become active.
    #[error("reaction menu could not start: {0}")]
    Start(TransportError),

    /// A transport operation failed while the menu was active.
    #[error("reaction menu round failed: {0}")]
    Round(TransportError),

    /// The finish callback failed.
    #[error("reaction menu finish callback failed: {0}")]
    Finish(TransportError),

    /// Menus are not available in direct-message channels.
    #[error("reaction menus cannot be created in direct-message channel {0}")]
    DirectMessage(ChannelId),
}

/// Options for a [`ReactionMenu`].
#[derive(Clone)]
pub struct ReactionMenuOptions {
    timeout: Duration,
    max_total_reactions: Option<u32>,
    filter: Option<MenuFilter>,
}

impl ReactionMenuOptions {
    /// Creates options with the default timeout and no round budget.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: DEFAULT_MENU_TIMEOUT,
            max_total_reactions: None,
            filter: None,
        }
    }

    /// Sets the time each round waits for a reaction.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Limits the number of rounds.
    #[must_use]
    pub const fn with_max_total_reactions(mut self, rounds: u32) -> Self {
        self.max_total_reactions = Some(rounds);
        self
    }

    /// Adds a predicate every qualifying reaction must satisfy.
    #[must_use]
    pub fn with_filter(
        mut self,
        filter: impl Fn(&ReactionEvent) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Returns the per-round timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the round budget, if any.
    #[must_use]
    pub const fn max_total_reactions(&self) -> Option<u32> {
        self.max_total_reactions
    }
}

impl Default for ReactionMenuOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReactionMenuOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactionMenuOptions")
            .field("timeout", &self.timeout)
            .field("max_total_reactions", &self.max_total_reactions)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Outcome of a menu that terminated without a transport failure.
#[derive(Debug)]
pub struct MenuReport<H> {
    /// Why the menu stopped.
    pub termination: MenuTermination,
    /// Number of reactions handed to the handler.
    pub rounds: u32,
    /// The handler, returned so callers can read what it collected.
    pub handler: H,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuState {
    Created,
    Active,
    Terminated,
}

/// Reaction menu bound to one outbound message.
///
/// [`run`](Self::run) consumes the menu, so a terminated menu can never be
/// restarted.
pub struct ReactionMenu<H> {
    transport: Arc<dyn ChatTransport>,
    message: MessageHandle,
    emojis: Vec<String>,
    options: ReactionMenuOptions,
    handler: H,
}

impl<H> ReactionMenu<H>
where
    H: MenuHandler,
{
    /// Creates a menu in the `Created` state.
    #[must_use]
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        message: MessageHandle,
        emojis: impl IntoIterator<Item = impl Into<String>>,
        handler: H,
        options: ReactionMenuOptions,
    ) -> Self {
        Self {
            transport,
            message,
            emojis: emojis.into_iter().map(Into::into).collect(),
            options,
            handler,
        }
    }

    /// Returns the message the menu is bound to.
    #[must_use]
    pub const fn message(&self) -> &MessageHandle {
        &self.message
    }

    /// Returns the candidate emoji.
    #[must_use]
    pub fn emojis(&self) -> &[String] {
        &self.emojis
    }

    /// Starts the menu and drives it until it terminates.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::Start`] when the first round cannot be prepared
    /// (for example when the channel forbids reactions),
    /// [`MenuError::Round`] when a later transport operation fails, and
    /// [`MenuError::Finish`] when the finish callback fails. The finish
    /// callback has run in every case.
    pub async fn run(self) -> Result<MenuReport<H>, MenuError> {
        let Self {
            transport,
            message,
            emojis,
            options,
            mut handler,
        } = self;
        let qualifies = |event: &ReactionEvent| {
            !event.user_is_bot
                && emojis.contains(&event.emoji)
                && options.filter.as_ref().is_none_or(|filter| filter(event))
        };

        let mut state = MenuState::Created;
        let mut rounds = 0_u32;
        let termination = loop {
            if options
                .max_total_reactions
                .is_some_and(|budget| rounds >= budget)
            {
                break MenuTermination::RoundBudgetExhausted;
            }
            if let Err(error) = prepare_round(transport.as_ref(), &message, &emojis).await {
                break MenuTermination::Failed(error);
            }
            if state == MenuState::Created {
                state = MenuState::Active;
                tracing::debug!(message = %message.id(), "reaction menu active");
            }

            let event = match transport
                .await_reaction(&message, &qualifies, options.timeout)
                .await
            {
                Ok(Some(event)) => event,
                Ok(None) => break MenuTermination::TimedOut,
                Err(error) => break MenuTermination::Failed(error),
            };
            if let Err(error) = transport
                .remove_reaction(&message, &event.emoji, &event.user)
                .await
            {
                break MenuTermination::Failed(error);
            }

            rounds += 1;
            match handler
                .on_reaction(transport.as_ref(), &message, &event)
                .await
            {
                Ok(ReactionOutcome::Continue) => {}
                Ok(ReactionOutcome::Done) => break MenuTermination::Completed,
                Err(error) => break MenuTermination::Failed(error),
            }
        };

        let was_active = state == MenuState::Active;
        state = MenuState::Terminated;
        tracing::debug!(
            message = %message.id(),
            ?state,
            rounds,
            termination = ?termination,
            "reaction menu terminated"
        );

        let finished = handler
            .on_finish(transport.as_ref(), &message, &termination)
            .await;

        match termination {
            MenuTermination::Failed(error) => {
                tracing::warn!(message = %message.id(), %error, "reaction menu failed");
                if let Err(finish_error) = finished {
                    tracing::warn!(
                        message = %message.id(),
                        error = %finish_error,
                        "reaction menu finish callback failed"
                    );
                }
                Err(if was_active {
                    MenuError::Round(error)
                } else {
                    MenuError::Start(error)
                })
            }
            settled => {
                finished.map_err(MenuError::Finish)?;
                Ok(MenuReport {
                    termination: settled,
                    rounds,
                    handler,
                })
            }
        }
    }
}

impl<H> ReactionMenu<H>
where
    H: MenuHandler + 'static,
{
    /// Starts the menu on the tokio runtime and returns immediately.
    #[must_use = "the join handle reports how the menu terminated"]
    pub fn spawn(self) -> JoinHandle<Result<MenuReport<H>, MenuError>> {
        tokio::spawn(self.run())
    }
}

impl<H> fmt::Debug for ReactionMenu<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactionMenu")
            .field("message", &self.message)
            .field("emojis", &self.emojis)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Resets the message so every round starts from the bare emoji set.
async fn prepare_round(
    transport: &dyn ChatTransport,
    message: &MessageHandle,
    emojis: &[String],
) -> TransportResult<()> {
    transport.clear_reactions(message).await?;
    transport.set_reactions(message, emojis).await
}
