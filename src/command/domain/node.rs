//! Command tree nodes and their builder.
//!
//! A [`CommandNode`] is either a branch that owns subcommands or a leaf that
//! owns a usage schema and a run action. Nodes are immutable once built; the
//! builder enforces every structural rule up front.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::{
    Argument, CommandDefinitionError, DEFAULT_GROUP, DefinitionResult, RateLimit, Usage,
    normalise_name,
};
use crate::command::ports::CommandAction;

/// One documented example invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandExample {
    /// Invocation text without the prefix, for example `git commit fix`.
    pub invocation: String,
    /// What the invocation does.
    pub explanation: String,
}

/// Help metadata shown by the `help` command and usage messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandHelp {
    /// One-line description.
    pub description: String,
    /// Longer explanation, if any.
    pub details: Option<String>,
    /// Example invocations.
    pub examples: Vec<CommandExample>,
}

/// Branch or leaf payload of a node.
#[derive(Clone)]
pub enum NodeKind {
    /// A node that only dispatches to subcommands.
    Branch {
        /// Subcommands in registration order.
        children: Vec<CommandNode>,
    },
    /// A runnable node.
    Leaf {
        /// Argument schema.
        usage: Usage,
        /// Action invoked with the matched values.
        action: Arc<dyn CommandAction>,
    },
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch { children } => f
                .debug_struct("Branch")
                .field("children", children)
                .finish(),
            Self::Leaf { usage, .. } => f
                .debug_struct("Leaf")
                .field("usage", &usage.to_string())
                .finish_non_exhaustive(),
        }
    }
}

/// A named, aliased unit of the command tree.
#[derive(Debug, Clone)]
pub struct CommandNode {
    name: String,
    aliases: Vec<String>,
    group: String,
    owner_only: bool,
    dm_allowed: bool,
    hidden: bool,
    help: CommandHelp,
    rate_limit: Option<Arc<RateLimit>>,
    parent: Option<String>,
    kind: NodeKind,
}

impl CommandNode {
    /// Returns the node name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the aliases.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Returns the group name.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Returns `true` when only the owner may invoke the command.
    #[must_use]
    pub const fn is_owner_only(&self) -> bool {
        self.owner_only
    }

    /// Returns `true` when the command may run in direct messages.
    #[must_use]
    pub const fn is_dm_allowed(&self) -> bool {
        self.dm_allowed
    }

    /// Returns `true` when help listings skip the command.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Returns the help metadata.
    #[must_use]
    pub const fn help(&self) -> &CommandHelp {
        &self.help
    }

    /// Returns the one-line description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.help.description
    }

    /// Returns the rate limit, if any.
    #[must_use]
    pub fn rate_limit(&self) -> Option<&RateLimit> {
        self.rate_limit.as_deref()
    }

    /// Returns the full path of the parent node, or `None` at top level.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Returns the branch or leaf payload.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns the subcommands; empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match &self.kind {
            NodeKind::Branch { children } => children,
            NodeKind::Leaf { .. } => &[],
        }
    }

    /// Returns the usage schema of a leaf.
    #[must_use]
    pub const fn usage(&self) -> Option<&Usage> {
        match &self.kind {
            NodeKind::Branch { .. } => None,
            NodeKind::Leaf { usage, .. } => Some(usage),
        }
    }

    /// Returns the space-separated path from the top-level ancestor.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.parent.as_ref().map_or_else(
            || self.name.clone(),
            |parent| format!("{parent} {}", self.name),
        )
    }

    /// Renders the invocation pattern without prefix, for example
    /// `git (add/commit/push)` or `range <min> [max]`.
    #[must_use]
    pub fn usage_string(&self) -> String {
        match &self.kind {
            NodeKind::Branch { children } => {
                let names: Vec<&str> = children.iter().map(Self::name).collect();
                format!("{} ({})", self.full_name(), names.join("/"))
            }
            NodeKind::Leaf { usage, .. } if usage.is_empty() => self.full_name(),
            NodeKind::Leaf { usage, .. } => format!("{} {usage}", self.full_name()),
        }
    }

    /// Returns `true` when `token` equals the name or one of the aliases.
    #[must_use]
    pub fn answers_to(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|alias| alias == token)
    }

    /// Returns every name and alias the node answers to.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Finds the subcommand answering to `token`.
    ///
    /// Lookup is case-insensitive. An exact name match wins over an alias
    /// match.
    #[must_use]
    pub fn find_child(&self, token: &str) -> Option<&Self> {
        find_in(self.children(), token)
    }
}

/// Finds the node answering to `token` among `siblings`, names first.
pub(crate) fn find_in<'a>(siblings: &'a [CommandNode], token: &str) -> Option<&'a CommandNode> {
    let wanted = token.to_lowercase();
    siblings
        .iter()
        .find(|node| node.name == wanted)
        .or_else(|| {
            siblings
                .iter()
                .find(|node| node.aliases.iter().any(|alias| *alias == wanted))
        })
}

/// Builder for [`CommandNode`].
#[derive(Clone)]
pub struct CommandBuilder {
    name: String,
    aliases: Vec<String>,
    group: Option<String>,
    owner_only: bool,
    dm_allowed: bool,
    hidden: bool,
    help: CommandHelp,
    rate_limit: Option<Arc<RateLimit>>,
    arguments: Vec<Argument>,
    subcommands: Vec<Self>,
    action: Option<Arc<dyn CommandAction>>,
}

impl CommandBuilder {
    /// Starts a command definition.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            group: None,
            owner_only: false,
            dm_allowed: false,
            hidden: false,
            help: CommandHelp {
                description: description.into(),
                details: None,
                examples: Vec::new(),
            },
            rate_limit: None,
            arguments: Vec::new(),
            subcommands: Vec::new(),
            action: None,
        }
    }

    /// Adds an alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Adds several aliases.
    #[must_use]
    pub fn with_aliases(mut self, aliases: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Places the command in `group`. Subcommands inherit their parent's
    /// group unless they set one.
    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Restricts the command to the bot owner. Top-level commands only.
    #[must_use]
    pub const fn owner_only(mut self) -> Self {
        self.owner_only = true;
        self
    }

    /// Allows the command in direct-message channels. Top-level commands
    /// only.
    #[must_use]
    pub const fn dm_allowed(mut self) -> Self {
        self.dm_allowed = true;
        self
    }

    /// Hides the command from help listings.
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Sets the longer help text.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.help.details = Some(details.into());
        self
    }

    /// Adds an example invocation.
    #[must_use]
    pub fn with_example(
        mut self,
        invocation: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        self.help.examples.push(CommandExample {
            invocation: invocation.into(),
            explanation: explanation.into(),
        });
        self
    }

    /// Attaches a rate limit.
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = Some(Arc::new(rate_limit));
        self
    }

    /// Appends an argument slot.
    #[must_use]
    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Appends a subcommand.
    #[must_use]
    pub fn with_subcommand(mut self, subcommand: Self) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    /// Sets the run action.
    #[must_use]
    pub fn with_action(mut self, action: impl CommandAction + 'static) -> Self {
        self.action = Some(Arc::new(action));
        self
    }

    /// Sets a shared run action.
    #[must_use]
    pub fn with_shared_action(mut self, action: Arc<dyn CommandAction>) -> Self {
        self.action = Some(action);
        self
    }

    /// Builds a top-level node.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDefinitionError`] when a name is unusable, siblings
    /// collide, the usage schema is illegal, a subcommand sets `owner_only`
    /// or `dm_allowed`, or the node is neither a pure branch nor a runnable
    /// leaf.
    pub fn build(self) -> DefinitionResult<CommandNode> {
        self.build_under(None, DEFAULT_GROUP)
    }

    const fn top_level_flag(&self) -> Option<&'static str> {
        if self.owner_only {
            Some("owner_only")
        } else if self.dm_allowed {
            Some("dm_allowed")
        } else {
            None
        }
    }

    fn build_under(self, parent: Option<&str>, inherited_group: &str) -> DefinitionResult<CommandNode> {
        let name = normalise_name(&self.name)?;
        let full_name = parent.map_or_else(|| name.clone(), |path| format!("{path} {name}"));
        let aliases = normalise_aliases(&name, &full_name, &self.aliases)?;
        if let (Some(_), Some(flag)) = (parent, self.top_level_flag()) {
            return Err(CommandDefinitionError::TopLevelOnlyFlag {
                command: full_name,
                flag,
            });
        }
        let group = match &self.group {
            Some(group) => normalise_name(group)?,
            None => inherited_group.to_owned(),
        };

        let kind = if self.subcommands.is_empty() {
            let action = self
                .action
                .ok_or_else(|| CommandDefinitionError::MissingAction(full_name.clone()))?;
            NodeKind::Leaf {
                usage: Usage::new(self.arguments)?,
                action,
            }
        } else {
            if !self.arguments.is_empty() {
                return Err(CommandDefinitionError::BranchWithUsage(full_name));
            }
            if self.action.is_some() {
                return Err(CommandDefinitionError::BranchWithAction(full_name));
            }
            let children = self
                .subcommands
                .into_iter()
                .map(|child| child.build_under(Some(&full_name), &group))
                .collect::<DefinitionResult<Vec<_>>>()?;
            ensure_unique_siblings(&children, &full_name)?;
            NodeKind::Branch { children }
        };

        Ok(CommandNode {
            name,
            aliases,
            group,
            owner_only: self.owner_only,
            dm_allowed: self.dm_allowed,
            hidden: self.hidden,
            help: self.help,
            rate_limit: self.rate_limit,
            parent: parent.map(str::to_owned),
            kind,
        })
    }
}

impl fmt::Debug for CommandBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuilder")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("group", &self.group)
            .field("arguments", &self.arguments.len())
            .field("subcommands", &self.subcommands)
            .field("has_action", &self.action.is_some())
            .finish_non_exhaustive()
    }
}

fn normalise_aliases(name: &str, full_name: &str, raw: &[String]) -> DefinitionResult<Vec<String>> {
    let mut seen = HashSet::from([name.to_owned()]);
    raw.iter()
        .map(|alias| {
            let normalised = normalise_name(alias)?;
            if !seen.insert(normalised.clone()) {
                return Err(CommandDefinitionError::DuplicateName {
                    scope: full_name.to_owned(),
                    name: normalised,
                });
            }
            Ok(normalised)
        })
        .collect()
}

/// Checks that no two siblings share a name or alias.
pub(crate) fn ensure_unique_siblings(siblings: &[CommandNode], scope: &str) -> DefinitionResult<()> {
    let mut seen = HashSet::new();
    for name in siblings.iter().flat_map(CommandNode::names) {
        if !seen.insert(name) {
            return Err(CommandDefinitionError::DuplicateName {
                scope: scope.to_owned(),
                name: name.to_owned(),
            });
        }
    }
    Ok(())
}
