//! `help`: command listings and per-command help.

use async_trait::async_trait;

use crate::command::domain::{Argument, CommandBuilder, CommandGroup, CommandNode};
use crate::command::ports::{ActionResult, CommandAction};
use crate::command::services::CommandRegistry;
use crate::interaction::services::CommandContext;

/// Lists commands, or describes the command or group named in the argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelpAction;

#[async_trait]
impl CommandAction for HelpAction {
    async fn run(&self, context: &CommandContext, arguments: Vec<String>) -> ActionResult<()> {
        let prefix = context.config().prefix();
        let registry = context.registry();
        let query = arguments.first().map(String::as_str).unwrap_or_default().trim();
        let text = if query.is_empty() {
            general_help(registry, prefix, context.is_owner())
        } else if let Some(node) = registry.resolve(query) {
            command_help(node, prefix)
        } else if let Some(group) = registry.group(query) {
            group_help(registry, group, prefix, context.is_owner())
        } else {
            format!("Could not find command or command group `{query}`")
        };
        context.say(&text).await?;
        Ok(())
    }
}

/// Renders the listing of every visible command, grouped.
///
/// Hidden commands are skipped. Owner-only commands are shown, marked with
/// `(!)`, only when `viewer_is_owner` is set.
#[must_use]
pub fn general_help(registry: &CommandRegistry, prefix: &str, viewer_is_owner: bool) -> String {
    let mut text = String::from("**Bot Commands**\n");
    text.push_str(&format!(
        "(Use `{prefix}help [command]` for more info on a single command)\n"
    ));
    for group in registry.groups() {
        let listing = command_lines(registry, group, prefix, viewer_is_owner);
        if !listing.is_empty() {
            text.push_str(&format!("__{}__\n", group.display_name()));
            text.push_str(&listing);
        }
    }
    text
}

/// Renders the help for a single command.
#[must_use]
pub fn command_help(node: &CommandNode, prefix: &str) -> String {
    let mut text = format!("`{prefix}{}`: {}", node.full_name(), node.description());
    if let Some(details) = &node.help().details {
        text.push_str(&format!("\n\n{details}"));
    }
    if !node.aliases().is_empty() {
        let aliases: Vec<String> = node
            .aliases()
            .iter()
            .map(|alias| format!("`{prefix}{alias}`"))
            .collect();
        text.push_str(&format!("\n\n**Aliases**: {}", aliases.join(", ")));
    }
    text.push_str(&format!("\n\n**Usage**: `{prefix}{}`", node.usage_string()));
    let examples = &node.help().examples;
    if !examples.is_empty() {
        text.push_str("\n\n**Examples**:");
        for example in examples {
            text.push_str(&format!(
                "\n\t`{prefix}{}` - {}",
                example.invocation, example.explanation
            ));
        }
    }
    text
}

fn group_help(
    registry: &CommandRegistry,
    group: &CommandGroup,
    prefix: &str,
    viewer_is_owner: bool,
) -> String {
    let mut text = format!("__{}__ commands: {}\n", group.display_name(), group.description());
    text.push_str(&command_lines(registry, group, prefix, viewer_is_owner));
    text
}

fn command_lines(
    registry: &CommandRegistry,
    group: &CommandGroup,
    prefix: &str,
    viewer_is_owner: bool,
) -> String {
    let mut lines = String::new();
    let visible = registry.commands().iter().filter(|command| {
        command.group() == group.name()
            && !command.is_hidden()
            && (!command.is_owner_only() || viewer_is_owner)
    });
    for command in visible {
        lines.push_str(&format!(
            "  `{prefix}{}` - {}",
            command.name(),
            command.description()
        ));
        if command.is_owner_only() {
            lines.push_str(" (!)");
        }
        lines.push('\n');
    }
    lines
}

pub(super) fn command() -> CommandBuilder {
    CommandBuilder::new(
        "help",
        "List all the available commands, or get help for a particular command",
    )
    .in_group(super::UTIL_GROUP)
    .with_argument(Argument::new("command").optional("").multi())
    .with_example("help", "List out all the help commands")
    .with_example("help ping", "Get specific help text for the `ping` command")
    .dm_allowed()
    .with_action(HelpAction)
}
