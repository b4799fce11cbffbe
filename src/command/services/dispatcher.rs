//! Entry point turning incoming messages into command executions.

use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::{CommandError, CommandRegistry, CommandResult};
use crate::config::BotConfig;
use crate::interaction::{
    domain::MessageHandle,
    ports::ChatTransport,
    services::{CommandContext, ShutdownSignal},
};

/// Extra predicate applied to prefixed messages before lookup.
pub type MessageGate = Arc<dyn Fn(&MessageHandle, &BotConfig) -> bool + Send + Sync>;

/// Why a resolved command was refused before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The command is owner-only and the invoker is not the owner.
    OwnerOnly,
    /// The command is not allowed in direct messages.
    DirectMessage,
}

/// What happened to an incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a command: bot author, missing prefix, empty text or gated out.
    Ignored,
    /// No top-level command answers to the first token.
    NotFound,
    /// The command exists but the invoker may not run it here.
    Denied(DenialReason),
    /// The command's action ran.
    Handled,
    /// Throttled, unknown subcommand, or usage mismatch.
    Rejected,
}

/// Glues incoming text to registry lookup and node execution.
pub struct Dispatcher<C>
where
    C: Clock + Send + Sync,
{
    transport: Arc<dyn ChatTransport>,
    registry: Arc<CommandRegistry>,
    config: Arc<BotConfig>,
    shutdown: ShutdownSignal,
    clock: C,
    gate: Option<MessageGate>,
}

impl<C> Dispatcher<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        registry: CommandRegistry,
        config: BotConfig,
        clock: C,
    ) -> Self {
        Self {
            transport,
            registry: Arc::new(registry),
            config: Arc::new(config),
            shutdown: ShutdownSignal::new(),
            clock,
            gate: None,
        }
    }

    /// Adds a predicate every prefixed message must pass.
    #[must_use]
    pub fn with_gate(
        mut self,
        gate: impl Fn(&MessageHandle, &BotConfig) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.gate = Some(Arc::new(gate));
        self
    }

    /// Returns the registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Returns the shutdown signal triggered by the `shutdown` command.
    #[must_use]
    pub const fn shutdown(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    /// Handles one incoming message.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`](super::CommandError) when a reply cannot be
    /// sent or the command's action fails.
    pub async fn handle(&self, message: &MessageHandle) -> CommandResult<DispatchOutcome> {
        if message.author_is_bot() || self.transport.is_bot(message.author()).await? {
            return Ok(DispatchOutcome::Ignored);
        }
        let Some(text) = message.content().strip_prefix(self.config.prefix()) else {
            return Ok(DispatchOutcome::Ignored);
        };
        if self
            .gate
            .as_ref()
            .is_some_and(|gate| !gate(message, &self.config))
        {
            tracing::debug!(message = %message.id(), "message rejected by gate");
            return Ok(DispatchOutcome::Ignored);
        }
        let trimmed = text.trim_start();
        let Some(head) = trimmed.split_whitespace().next() else {
            return Ok(DispatchOutcome::Ignored);
        };
        let remaining = trimmed.get(head.len()..).unwrap_or_default();

        let Some(command) = self.registry.command(head) else {
            tracing::info!(user = %message.author(), command = head, "command not found");
            self.transport
                .send_message(message.channel(), &format!("Command not found: `{head}`"))
                .await?;
            return Ok(DispatchOutcome::NotFound);
        };

        if command.is_owner_only() && message.author() != self.config.owner() {
            tracing::info!(user = %message.author(), command = command.name(), "owner-only command denied");
            self.transport
                .send_message(message.channel(), "This command can only be used by the owner")
                .await?;
            return Ok(DispatchOutcome::Denied(DenialReason::OwnerOnly));
        }
        if !command.is_dm_allowed() && self.transport.is_direct_message(message.channel()).await? {
            tracing::info!(user = %message.author(), command = command.name(), "direct-message use denied");
            self.transport
                .send_message(
                    message.channel(),
                    "This command cannot be used in direct messages",
                )
                .await?;
            return Ok(DispatchOutcome::Denied(DenialReason::DirectMessage));
        }

        let context = CommandContext::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.registry),
            Arc::clone(&self.config),
            self.shutdown.clone(),
            message.clone(),
            self.clock.utc().timestamp_millis(),
        );
        let handled = command.execute(remaining, &context).await.inspect_err(|error| {
            tracing::error!(user = %message.author(), command = command.name(), %error, "command failed");
        })?;
        tracing::info!(
            user = %message.author(),
            command = command.name(),
            handled,
            "command dispatched"
        );
        Ok(if handled {
            DispatchOutcome::Handled
        } else {
            DispatchOutcome::Rejected
        })
    }

    /// Sends the owner a private notice about a failed message.
    ///
    /// A notice that cannot be delivered is only logged.
    pub async fn report_failure(&self, message: &MessageHandle, error: &CommandError) {
        tracing::error!(message = %message.id(), %error, "message handling failed");
        let notice = format!(
            "Unhandled error while handling `{}` from <@{}>: {error}",
            message.content(),
            message.author()
        );
        if let Err(delivery) = self
            .transport
            .send_direct_message(self.config.owner(), &notice)
            .await
        {
            tracing::warn!(error = %delivery, "failed to notify the owner");
        }
    }
}

impl<C> Dispatcher<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Handles messages from `inbox` until shutdown is requested or the
    /// inbox closes.
    ///
    /// Each message is handled on its own task. Failures are reported to
    /// the owner through [`report_failure`](Self::report_failure).
    pub async fn serve(self: Arc<Self>, mut inbox: mpsc::Receiver<MessageHandle>) {
        let mut stop = self.shutdown.subscribe();
        loop {
            tokio::select! {
                changed = stop.wait_for(|stopped| *stopped) => {
                    if changed.is_ok() {
                        tracing::info!("shutting down dispatcher");
                    }
                    break;
                }
                next = inbox.recv() => {
                    let Some(message) = next else {
                        tracing::info!("inbox closed");
                        break;
                    };
                    let dispatcher = Arc::clone(&self);
                    tokio::spawn(async move {
                        if let Err(error) = dispatcher.handle(&message).await {
                            dispatcher.report_failure(&message, &error).await;
                        }
                    });
                }
            }
        }
    }
}

impl<C> fmt::Debug for Dispatcher<C>
where
    C: Clock + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("has_gate", &self.gate.is_some())
            .finish_non_exhaustive()
    }
}
