//! Declarative command catalogs.
//!
//! A catalog describes groups and command trees as data. Run actions cannot
//! be serialised, so they are bound separately by full command path (for
//! example `git commit`) through [`ActionBindings`].

use camino::Utf8Path;
use cap_std::fs_utf8::Dir;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::{
    Argument, CommandBuilder, CommandDefinitionError, CommandGroup, DefinitionResult, RateLimit,
    ValidatorSpec, normalise_name,
};
use crate::command::ports::CommandAction;
use crate::config::{ConfigError, read_json};

/// Declared argument slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentDeclaration {
    /// Slot name.
    pub name: String,
    /// Validator; defaults to `string`.
    #[serde(default)]
    pub validator: ValidatorSpec,
    /// Whether the slot may be omitted.
    #[serde(default)]
    pub optional: bool,
    /// Whether the slot consumes all remaining tokens.
    #[serde(default)]
    pub multi: bool,
    /// Default for optional slots; the empty string when absent.
    #[serde(default)]
    pub default: Option<String>,
}

/// Declared rate limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitDeclaration {
    /// Window length in seconds.
    pub window_seconds: u64,
    /// Hits allowed per window.
    pub max_hits: u32,
    /// Throttle notice template.
    #[serde(default)]
    pub message: Option<String>,
}

/// Declared command or subcommand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDeclaration {
    /// Command name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Alternative names.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Group name; inherited from the parent when absent.
    #[serde(default)]
    pub group: Option<String>,
    /// Longer help text.
    #[serde(default)]
    pub details: Option<String>,
    /// Example invocations as `[invocation, explanation]` pairs.
    #[serde(default)]
    pub examples: Vec<(String, String)>,
    /// Argument schema of a leaf.
    #[serde(default)]
    pub usage: Vec<ArgumentDeclaration>,
    /// Subcommands of a branch.
    #[serde(default)]
    pub subcommands: Vec<Self>,
    /// Restricts the command to the owner.
    #[serde(default)]
    pub owner_only: bool,
    /// Allows the command in direct messages.
    #[serde(default)]
    pub dm_allowed: bool,
    /// Hides the command from help listings.
    #[serde(default)]
    pub hidden: bool,
    /// Optional rate limit.
    #[serde(default)]
    pub rate_limit: Option<RateLimitDeclaration>,
}

/// Declared group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDeclaration {
    /// Group name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Display name; the capitalised name when absent.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A set of group and command declarations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandCatalog {
    /// Groups to register before the commands.
    #[serde(default)]
    pub groups: Vec<GroupDeclaration>,
    /// Top-level commands.
    #[serde(default)]
    pub commands: Vec<CommandDeclaration>,
}

impl CommandCatalog {
    /// Parses a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_owned(),
            source,
        })
    }

    /// Loads a catalog file from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(dir: &Dir, path: &Utf8Path) -> Result<Self, ConfigError> {
        read_json(dir, path)
    }

    /// Converts the group declarations.
    ///
    /// # Errors
    ///
    /// Returns a definition error for unusable group names.
    pub fn build_groups(&self) -> DefinitionResult<Vec<CommandGroup>> {
        self.groups
            .iter()
            .map(|declaration| {
                let group = CommandGroup::new(&declaration.name, declaration.description.clone())?;
                Ok(match &declaration.display_name {
                    Some(display_name) => group.with_display_name(display_name.clone()),
                    None => group,
                })
            })
            .collect()
    }

    /// Converts the command declarations into builders, consuming the
    /// matching actions from `bindings`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDefinitionError::UnboundAction`] for leaves without
    /// an action, [`CommandDefinitionError::UnusedAction`] for bindings that
    /// match no leaf, and other definition errors for malformed
    /// declarations.
    pub fn build_commands(&self, mut bindings: ActionBindings) -> DefinitionResult<Vec<CommandBuilder>> {
        let builders = self
            .commands
            .iter()
            .map(|declaration| declaration.to_builder(None, &mut bindings))
            .collect::<DefinitionResult<Vec<_>>>()?;
        if let Some(path) = bindings.actions.into_keys().min() {
            return Err(CommandDefinitionError::UnusedAction(path));
        }
        Ok(builders)
    }
}

impl CommandDeclaration {
    fn to_builder(
        &self,
        parent: Option<&str>,
        bindings: &mut ActionBindings,
    ) -> DefinitionResult<CommandBuilder> {
        let name = normalise_name(&self.name)?;
        let path = parent.map_or_else(|| name.clone(), |parent_path| format!("{parent_path} {name}"));

        let mut builder =
            CommandBuilder::new(name, self.description.clone()).with_aliases(self.aliases.iter().cloned());
        if let Some(group) = &self.group {
            builder = builder.in_group(group.clone());
        }
        if let Some(details) = &self.details {
            builder = builder.with_details(details.clone());
        }
        for (invocation, explanation) in &self.examples {
            builder = builder.with_example(invocation.clone(), explanation.clone());
        }
        if self.owner_only {
            builder = builder.owner_only();
        }
        if self.dm_allowed {
            builder = builder.dm_allowed();
        }
        if self.hidden {
            builder = builder.hidden();
        }
        if let Some(declared) = &self.rate_limit {
            builder = builder.with_rate_limit(declared.to_rate_limit()?);
        }
        for argument in &self.usage {
            builder = builder.with_argument(argument.to_argument()?);
        }

        if self.subcommands.is_empty() {
            let action = bindings
                .actions
                .remove(&path)
                .ok_or_else(|| CommandDefinitionError::UnboundAction(path.clone()))?;
            return Ok(builder.with_shared_action(action));
        }
        for subcommand in &self.subcommands {
            builder = builder.with_subcommand(subcommand.to_builder(Some(&path), bindings)?);
        }
        Ok(builder)
    }
}

impl ArgumentDeclaration {
    fn to_argument(&self) -> DefinitionResult<Argument> {
        let mut argument =
            Argument::new(self.name.clone()).with_validator(self.validator.build(&self.name)?);
        if self.optional {
            argument = argument.optional(self.default.clone().unwrap_or_default());
        }
        if self.multi {
            argument = argument.multi();
        }
        Ok(argument)
    }
}

impl RateLimitDeclaration {
    fn to_rate_limit(&self) -> DefinitionResult<RateLimit> {
        let rate_limit = RateLimit::new(Duration::from_secs(self.window_seconds), self.max_hits)?;
        match &self.message {
            Some(template) => rate_limit.with_notice(template.clone()),
            None => Ok(rate_limit),
        }
    }
}

/// Run actions keyed by full command path.
#[derive(Clone, Default)]
pub struct ActionBindings {
    actions: HashMap<String, Arc<dyn CommandAction>>,
}

impl ActionBindings {
    /// Creates an empty set of bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `action` to the leaf at `path`, for example `git commit`.
    #[must_use]
    pub fn bind(mut self, path: &str, action: impl CommandAction + 'static) -> Self {
        self.actions.insert(normalise_path(path), Arc::new(action));
        self
    }

    /// Returns the number of unconsumed bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` when no bindings remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for ActionBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<&String> = self.actions.keys().collect();
        paths.sort();
        f.debug_struct("ActionBindings")
            .field("paths", &paths)
            .finish()
    }
}

fn normalise_path(path: &str) -> String {
    path.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
