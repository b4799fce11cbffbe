//! Built-in commands: `ping`, `help` and `shutdown`.
//!
//! They live in the `util` group, which [`register_defaults`] registers
//! alongside them.

mod help;
mod ping;
mod shutdown;

pub use help::{HelpAction, command_help, general_help};
pub use ping::{PONG_REPLIES, PingAction, pong_reply};
pub use shutdown::ShutdownAction;

use crate::command::domain::{CommandGroup, DefinitionResult};
use crate::command::services::CommandRegistry;

/// Name of the group holding the built-in commands.
pub const UTIL_GROUP: &str = "util";

/// Registers the `util` group and the built-in commands.
///
/// # Errors
///
/// Returns a definition error when `util` or a built-in name is already
/// registered.
pub fn register_defaults(registry: &mut CommandRegistry) -> DefinitionResult<&mut CommandRegistry> {
    registry
        .register_group(CommandGroup::new(UTIL_GROUP, "Built-in commands")?)?
        .register_command(ping::command())?
        .register_command(help::command())?
        .register_command(shutdown::command())
}
