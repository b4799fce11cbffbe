//! Argument slots of a usage schema.

use std::fmt;

use super::Validator;

/// Whether a slot must be supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentPresence {
    /// The token must be present.
    Required,
    /// The token may be omitted; `default` is substituted verbatim.
    Optional {
        /// Value used when the token is absent. Never validated.
        default: String,
    },
}

/// One slot in a [`Usage`](super::Usage) schema.
#[derive(Debug, Clone)]
pub struct Argument {
    name: String,
    validator: Validator,
    presence: ArgumentPresence,
    multi: bool,
}

impl Argument {
    /// Creates a mandatory, single-token slot accepting any string.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            validator: Validator::string(),
            presence: ArgumentPresence::Required,
            multi: false,
        }
    }

    /// Replaces the validator.
    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Makes the slot optional with the given default.
    #[must_use]
    pub fn optional(mut self, default: impl Into<String>) -> Self {
        self.presence = ArgumentPresence::Optional {
            default: default.into(),
        };
        self
    }

    /// Makes the slot consume every remaining token.
    #[must_use]
    pub const fn multi(mut self) -> Self {
        self.multi = true;
        self
    }

    /// Returns the slot name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the validator.
    #[must_use]
    pub const fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Returns the presence rule.
    #[must_use]
    pub const fn presence(&self) -> &ArgumentPresence {
        &self.presence
    }

    /// Returns `true` for optional slots.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        matches!(self.presence, ArgumentPresence::Optional { .. })
    }

    /// Returns `true` for multi slots.
    #[must_use]
    pub const fn is_multi(&self) -> bool {
        self.multi
    }

    /// Returns the default value of an optional slot.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        match &self.presence {
            ArgumentPresence::Required => None,
            ArgumentPresence::Optional { default } => Some(default),
        }
    }

    /// Runs the validator against `token`.
    #[must_use]
    pub fn accept(&self, token: &str) -> Option<String> {
        self.validator.validate(token)
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_optional() {
            write!(f, "[{}]", self.name)
        } else {
            write!(f, "<{}>", self.name)
        }
    }
}
