//! Usage schemas and token matching.

use std::fmt;
use thiserror::Error;

use super::{Argument, ArgumentPresence, CommandDefinitionError, DefinitionResult};

/// Why a token list did not match a [`Usage`].
///
/// Callers treat every variant as the same "invalid" outcome; the detail is
/// kept for logging.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsageMismatch {
    /// Fewer tokens than mandatory slots.
    #[error("expected at least {expected} token(s), got {actual}")]
    TooFewTokens {
        /// Number of mandatory slots.
        expected: usize,
        /// Number of tokens supplied.
        actual: usize,
    },

    /// More tokens than slots and no multi slot.
    #[error("expected at most {expected} token(s), got {actual}")]
    TooManyTokens {
        /// Number of slots.
        expected: usize,
        /// Number of tokens supplied.
        actual: usize,
    },

    /// A validator rejected a token.
    #[error("argument '{argument}' rejected '{token}'")]
    Rejected {
        /// Slot name.
        argument: String,
        /// Rejected token (joined tokens for multi slots).
        token: String,
    },
}

/// An ordered, validated list of argument slots.
#[derive(Debug, Clone, Default)]
pub struct Usage {
    arguments: Vec<Argument>,
    mandatory_count: usize,
    optional_count: usize,
    has_multi: bool,
}

impl Usage {
    /// Creates a usage schema.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDefinitionError::OptionalBeforeMandatory`] when a
    /// mandatory slot follows an optional one, and
    /// [`CommandDefinitionError::MultiNotLast`] when any slot follows a multi
    /// slot.
    pub fn new(arguments: Vec<Argument>) -> DefinitionResult<Self> {
        let mut seen_optional = false;
        let mut multi: Option<&str> = None;
        for argument in &arguments {
            if let Some(multi_name) = multi {
                return Err(CommandDefinitionError::MultiNotLast {
                    multi: multi_name.to_owned(),
                    argument: argument.name().to_owned(),
                });
            }
            if seen_optional && !argument.is_optional() {
                return Err(CommandDefinitionError::OptionalBeforeMandatory {
                    argument: argument.name().to_owned(),
                });
            }
            seen_optional |= argument.is_optional();
            if argument.is_multi() {
                multi = Some(argument.name());
            }
        }

        let optional_count = arguments.iter().filter(|arg| arg.is_optional()).count();
        let has_multi = arguments.iter().any(Argument::is_multi);
        Ok(Self {
            mandatory_count: arguments.len().saturating_sub(optional_count),
            optional_count,
            has_multi,
            arguments,
        })
    }

    /// Returns a schema that accepts no tokens.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            arguments: Vec::new(),
            mandatory_count: 0,
            optional_count: 0,
            has_multi: false,
        }
    }

    /// Returns the slots in order.
    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Returns `true` when the schema has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Returns the number of mandatory slots.
    #[must_use]
    pub const fn mandatory_count(&self) -> usize {
        self.mandatory_count
    }

    /// Returns the number of optional slots.
    #[must_use]
    pub const fn optional_count(&self) -> usize {
        self.optional_count
    }

    /// Returns `true` when the last slot is a multi slot.
    #[must_use]
    pub const fn has_multi(&self) -> bool {
        self.has_multi
    }

    /// Matches `tokens` against the schema.
    ///
    /// Returns one value per slot in schema order. Omitted optional slots
    /// yield their default; a multi slot receives the remaining tokens joined
    /// with single spaces. The match is all-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns [`UsageMismatch`] when the arity is wrong or any validator
    /// rejects its token.
    pub fn match_tokens(&self, tokens: &[&str]) -> Result<Vec<String>, UsageMismatch> {
        if tokens.len() < self.mandatory_count {
            return Err(UsageMismatch::TooFewTokens {
                expected: self.mandatory_count,
                actual: tokens.len(),
            });
        }
        let capacity = self.mandatory_count + self.optional_count;
        if tokens.len() > capacity && !self.has_multi {
            return Err(UsageMismatch::TooManyTokens {
                expected: capacity,
                actual: tokens.len(),
            });
        }

        let mut remaining = tokens.iter().copied();
        let mut values = Vec::with_capacity(self.arguments.len());
        for argument in &self.arguments {
            let supplied = if argument.is_multi() {
                let rest: Vec<&str> = remaining.by_ref().collect();
                (!rest.is_empty()).then(|| rest.join(" "))
            } else {
                remaining.next().map(str::to_owned)
            };

            let value = match (supplied, argument.presence()) {
                (Some(token), _) => argument
                    .accept(&token)
                    .ok_or_else(|| UsageMismatch::Rejected {
                        argument: argument.name().to_owned(),
                        token,
                    })?,
                (None, ArgumentPresence::Optional { default }) => default.clone(),
                (None, ArgumentPresence::Required) => {
                    return Err(UsageMismatch::TooFewTokens {
                        expected: self.mandatory_count,
                        actual: tokens.len(),
                    });
                }
            };
            values.push(value);
        }
        Ok(values)
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for argument in &self.arguments {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{argument}")?;
            first = false;
        }
        Ok(())
    }
}
