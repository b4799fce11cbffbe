//! Registry of top-level commands and groups.

use super::builtin;
use crate::command::domain::{
    ActionBindings, CommandBuilder, CommandCatalog, CommandDefinitionError, CommandGroup,
    CommandNode, DefinitionResult, ensure_unique_siblings, find_in,
};
use crate::config::BotConfig;

/// Top-level commands and the groups they belong to.
///
/// The registry is written during bootstrap and read-only afterwards; share
/// it through an `Arc`. It always contains the `default` group.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: Vec<CommandNode>,
    groups: Vec<CommandGroup>,
}

impl CommandRegistry {
    /// Creates a registry holding only the `default` group.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            groups: vec![CommandGroup::default_group()],
        }
    }

    /// Creates a registry for `config`, with the built-in commands when
    /// [`BotConfig::register_defaults`] is set.
    ///
    /// # Errors
    ///
    /// Returns a definition error if the built-ins cannot be registered.
    pub fn for_config(config: &BotConfig) -> DefinitionResult<Self> {
        let mut registry = Self::new();
        if config.register_defaults() {
            builtin::register_defaults(&mut registry)?;
        }
        Ok(registry)
    }

    /// Registers a group.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDefinitionError::DuplicateGroup`] when the name is
    /// taken.
    pub fn register_group(&mut self, group: CommandGroup) -> DefinitionResult<&mut Self> {
        if self.group(group.name()).is_some() {
            return Err(CommandDefinitionError::DuplicateGroup(group.name().to_owned()));
        }
        tracing::debug!(group = group.name(), "registered command group");
        self.groups.push(group);
        Ok(self)
    }

    /// Registers several groups in order.
    ///
    /// # Errors
    ///
    /// Stops at the first duplicate group.
    pub fn register_groups(
        &mut self,
        groups: impl IntoIterator<Item = CommandGroup>,
    ) -> DefinitionResult<&mut Self> {
        for group in groups {
            self.register_group(group)?;
        }
        Ok(self)
    }

    /// Builds and registers a top-level command.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDefinitionError`] when the command is malformed,
    /// collides with an existing top-level name or alias, or references an
    /// unknown group anywhere in its subtree.
    pub fn register_command(&mut self, command: CommandBuilder) -> DefinitionResult<&mut Self> {
        let node = command.build()?;
        self.register_node(node)
    }

    /// Registers an already built top-level node.
    ///
    /// # Errors
    ///
    /// See [`register_command`](Self::register_command).
    pub fn register_node(&mut self, node: CommandNode) -> DefinitionResult<&mut Self> {
        if let Some(taken) = node.names().find(|name| find_in(&self.commands, name).is_some()) {
            return Err(CommandDefinitionError::DuplicateName {
                scope: "top level".to_owned(),
                name: taken.to_owned(),
            });
        }
        self.ensure_groups_exist(&node)?;
        tracing::debug!(command = node.name(), group = node.group(), "registered command");
        self.commands.push(node);
        Ok(self)
    }

    /// Registers every group and command of `catalog`, binding leaf actions
    /// from `bindings`.
    ///
    /// Registration is all-or-nothing: on error the registry is unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first definition error found in the catalog.
    pub fn register_catalog(
        &mut self,
        catalog: &CommandCatalog,
        bindings: ActionBindings,
    ) -> DefinitionResult<&mut Self> {
        let mut staged = self.clone();
        staged.register_groups(catalog.build_groups()?)?;
        for command in catalog.build_commands(bindings)? {
            staged.register_command(command)?;
        }
        *self = staged;
        Ok(self)
    }

    /// Finds a top-level command by name or alias.
    #[must_use]
    pub fn command(&self, name: &str) -> Option<&CommandNode> {
        find_in(&self.commands, name)
    }

    /// Finds a group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&CommandGroup> {
        let wanted = name.to_lowercase();
        self.groups.iter().find(|group| group.name() == wanted)
    }

    /// Returns the top-level commands in registration order.
    #[must_use]
    pub fn commands(&self) -> &[CommandNode] {
        &self.commands
    }

    /// Returns the groups in registration order.
    #[must_use]
    pub fn groups(&self) -> &[CommandGroup] {
        &self.groups
    }

    /// Resolves a space-separated command path such as `git commit`.
    ///
    /// Every token must match; an unknown subcommand yields `None` rather
    /// than the deepest branch reached.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&CommandNode> {
        let mut tokens = path.split_whitespace();
        let mut node = self.command(tokens.next()?)?;
        for token in tokens {
            node = node.find_child(token)?;
        }
        tracing::debug!(path, command = %node.full_name(), "resolved command path");
        Some(node)
    }

    fn ensure_groups_exist(&self, node: &CommandNode) -> DefinitionResult<()> {
        if self.group(node.group()).is_none() {
            return Err(CommandDefinitionError::UnknownGroup {
                command: node.full_name(),
                group: node.group().to_owned(),
            });
        }
        ensure_unique_siblings(node.children(), &node.full_name())?;
        node.children()
            .iter()
            .try_for_each(|child| self.ensure_groups_exist(child))
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
