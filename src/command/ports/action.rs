//! Run actions invoked by leaf commands.

use async_trait::async_trait;
use std::future::Future;
use thiserror::Error;

use crate::interaction::{
    ports::TransportError,
    services::{CommandContext, MenuError},
};

/// Result type for command actions.
pub type ActionResult<T> = Result<T, ActionError>;

/// Behaviour run when a leaf command's usage matches.
#[async_trait]
pub trait CommandAction: Send + Sync {
    /// Runs the command with one value per usage slot.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] when the action cannot complete.
    async fn run(&self, context: &CommandContext, arguments: Vec<String>) -> ActionResult<()>;
}

/// Errors raised by command actions.
#[derive(Debug, Clone, Error)]
pub enum ActionError {
    /// A transport operation failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A reaction menu or reaction prompt failed.
    #[error(transparent)]
    Menu(#[from] MenuError),

    /// Action-specific failure.
    #[error("{0}")]
    Failed(String),
}

impl ActionError {
    /// Creates an action-specific failure.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }
}

/// Adapter turning an async closure into a [`CommandAction`].
#[derive(Debug, Clone)]
pub struct FnAction<F>(F);

#[async_trait]
impl<F, Fut> CommandAction for FnAction<F>
where
    F: Fn(CommandContext, Vec<String>) -> Fut + Send + Sync,
    Fut: Future<Output = ActionResult<()>> + Send + 'static,
{
    async fn run(&self, context: &CommandContext, arguments: Vec<String>) -> ActionResult<()> {
        (self.0)(context.clone(), arguments).await
    }
}

/// Wraps an async closure as a command action.
///
/// The closure receives an owned copy of the context so the returned future
/// does not borrow from the invocation.
#[must_use]
pub const fn action_fn<F, Fut>(action: F) -> FnAction<F>
where
    F: Fn(CommandContext, Vec<String>) -> Fut + Send + Sync,
    Fut: Future<Output = ActionResult<()>> + Send + 'static,
{
    FnAction(action)
}
