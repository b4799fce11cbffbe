//! Command groups used to organise help output.

use serde::{Deserialize, Serialize};

use super::{DefinitionResult, normalise_name};

/// Name of the group every registry starts with.
pub const DEFAULT_GROUP: &str = "default";

/// A named collection of commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandGroup {
    name: String,
    description: String,
    display_name: String,
}

impl CommandGroup {
    /// Creates a group whose display name is the capitalised name.
    ///
    /// # Errors
    ///
    /// Returns a definition error when the name is empty or contains
    /// whitespace.
    pub fn new(name: &str, description: impl Into<String>) -> DefinitionResult<Self> {
        let normalised = normalise_name(name)?;
        Ok(Self {
            display_name: capitalise(&normalised),
            name: normalised,
            description: description.into(),
        })
    }

    /// Overrides the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Returns the built-in default group.
    #[must_use]
    pub fn default_group() -> Self {
        Self {
            name: DEFAULT_GROUP.to_owned(),
            description: "Default group for ungrouped commands".to_owned(),
            display_name: capitalise(DEFAULT_GROUP),
        }
    }

    /// Returns the group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the name shown in help listings.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

fn capitalise(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
