//! `shutdown`: owner-only graceful stop.

use async_trait::async_trait;

use crate::command::domain::CommandBuilder;
use crate::command::ports::{ActionResult, CommandAction};
use crate::interaction::services::CommandContext;

/// Announces the shutdown and triggers the bot's shutdown signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShutdownAction;

#[async_trait]
impl CommandAction for ShutdownAction {
    async fn run(&self, context: &CommandContext, _arguments: Vec<String>) -> ActionResult<()> {
        context.say("Shutting down bot...").await?;
        tracing::info!(user = %context.author(), "shutdown requested");
        context.shutdown().trigger();
        Ok(())
    }
}

pub(super) fn command() -> CommandBuilder {
    CommandBuilder::new("shutdown", "Shutdown the bot")
        .in_group(super::UTIL_GROUP)
        .with_details("Gracefully shuts down the bot. This will make the bot offline!")
        .owner_only()
        .with_action(ShutdownAction)
}
