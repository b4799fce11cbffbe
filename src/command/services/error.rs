//! Errors surfaced by command execution and dispatch.

use thiserror::Error;

use crate::command::ports::ActionError;
use crate::interaction::ports::TransportError;

/// Result type for command execution and dispatch.
pub type CommandResult<T> = Result<T, CommandError>;

/// Failures that escape command execution.
///
/// Usage mismatches, throttling and unknown commands are answered in the
/// channel and never show up here.
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// Sending a reply or notice failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The run action failed.
    #[error("command '{command}' failed: {source}")]
    Action {
        /// Full command path.
        command: String,
        /// Underlying action error.
        #[source]
        source: ActionError,
    },

    /// The throttle notice template could not be rendered.
    #[error("failed to render throttle notice for '{command}': {reason}")]
    Notice {
        /// Full command path.
        command: String,
        /// Rendering error.
        reason: String,
    },
}
