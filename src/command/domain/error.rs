//! Error types raised while defining and registering commands.

use thiserror::Error;

/// Errors returned while building command trees and registries.
///
/// These are fatal at registration time and are never shown to chat users.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandDefinitionError {
    /// A command, alias or group name is empty after trimming.
    #[error("command names, aliases and group names must not be empty")]
    EmptyName,

    /// A name or alias contains whitespace.
    #[error("name '{0}' must not contain whitespace")]
    InvalidName(String),

    /// An optional argument is followed by a mandatory one.
    #[error("argument '{argument}' is mandatory but follows an optional argument")]
    OptionalBeforeMandatory {
        /// The mandatory argument that appeared too late.
        argument: String,
    },

    /// A multi argument is not the last argument.
    #[error("argument '{argument}' follows multi argument '{multi}'")]
    MultiNotLast {
        /// The multi argument.
        multi: String,
        /// The argument declared after it.
        argument: String,
    },

    /// Two siblings share a name or alias.
    #[error("'{name}' is already used by another command under {scope}")]
    DuplicateName {
        /// Parent path, or `top level`.
        scope: String,
        /// The colliding name or alias.
        name: String,
    },

    /// A command references a group that was never registered.
    #[error("no command group '{group}' found for command '{command}'")]
    UnknownGroup {
        /// Full command path.
        command: String,
        /// The missing group name.
        group: String,
    },

    /// A group with this name is already registered.
    #[error("group with name '{0}' already exists")]
    DuplicateGroup(String),

    /// A command has both subcommands and a usage schema.
    #[error("command '{0}' has subcommands and must not declare arguments")]
    BranchWithUsage(String),

    /// A command has both subcommands and a run action.
    #[error("command '{0}' has subcommands and must not declare a run action")]
    BranchWithAction(String),

    /// A subcommand sets a flag that is only checked on top-level commands.
    #[error("subcommand '{command}' must not set {flag}; it applies to top-level commands only")]
    TopLevelOnlyFlag {
        /// Full command path.
        command: String,
        /// The offending flag.
        flag: &'static str,
    },

    /// A leaf command has no run action.
    #[error("command '{0}' has no subcommands and no run action")]
    MissingAction(String),

    /// The rate limit allows fewer than one hit per window.
    #[error("rate limit max hits must be greater or equal to 1, got {0}")]
    InvalidRateLimit(u32),

    /// The throttle notice template does not compile.
    #[error("invalid throttle notice template: {0}")]
    InvalidNoticeTemplate(String),

    /// A declared validator cannot be built.
    #[error("invalid validator for argument '{argument}': {reason}")]
    InvalidValidator {
        /// Argument name.
        argument: String,
        /// Why the validator is unusable.
        reason: String,
    },

    /// A catalog leaf has no action bound to its full path.
    #[error("no action bound for catalog command '{0}'")]
    UnboundAction(String),

    /// An action was bound to a path that the catalog does not declare.
    #[error("action bound to unknown catalog command '{0}'")]
    UnusedAction(String),
}

/// Result type for command definition operations.
pub type DefinitionResult<T> = Result<T, CommandDefinitionError>;

/// Checks that `name` is usable as a command, alias or group name and
/// returns its normalised lowercase form.
///
/// # Errors
///
/// Returns [`CommandDefinitionError::EmptyName`] or
/// [`CommandDefinitionError::InvalidName`].
pub fn normalise_name(name: &str) -> DefinitionResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CommandDefinitionError::EmptyName);
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(CommandDefinitionError::InvalidName(trimmed.to_owned()));
    }
    Ok(trimmed.to_lowercase())
}
