//! Argument validators.
//!
//! A validator maps a raw token to its accepted value, or rejects it. Most
//! validators accept the token verbatim; mention validators strip the markup
//! and yield the bare identifier.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, LazyLock};

use super::{CommandDefinitionError, DefinitionResult};

static USER_MENTION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^<@!?(?P<id>[0-9]+)>$").ok());
static CHANNEL_MENTION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^<#(?P<id>[0-9]+)>$").ok());

/// Signature of a validation function.
pub type ValidatorFn = dyn Fn(&str) -> Option<String> + Send + Sync;

/// A named, pure token check.
#[derive(Clone)]
pub struct Validator {
    label: String,
    check: Arc<ValidatorFn>,
}

impl Validator {
    /// Creates a validator from an arbitrary function.
    #[must_use]
    pub fn custom(
        label: impl Into<String>,
        check: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            check: Arc::new(check),
        }
    }

    /// Accepts any token.
    #[must_use]
    pub fn string() -> Self {
        Self::custom("string", |token| Some(token.to_owned()))
    }

    /// Accepts tokens that parse as a signed 64-bit integer.
    #[must_use]
    pub fn integer() -> Self {
        Self::custom("integer", |token| {
            token.parse::<i64>().ok().map(|_| token.to_owned())
        })
    }

    /// Accepts integers within `min..=max`.
    #[must_use]
    pub fn integer_range(min: i64, max: i64) -> Self {
        Self::custom(format!("integer {min}..={max}"), move |token| {
            token
                .parse::<i64>()
                .ok()
                .filter(|value| (min..=max).contains(value))
                .map(|_| token.to_owned())
        })
    }

    /// Accepts tokens that parse as a number other than NaN.
    #[must_use]
    pub fn float() -> Self {
        Self::custom("float", |token| parse_float(token).map(|_| token.to_owned()))
    }

    /// Accepts numbers within `min..=max`.
    #[must_use]
    pub fn float_range(min: f64, max: f64) -> Self {
        Self::custom(format!("float {min}..={max}"), move |token| {
            parse_float(token)
                .filter(|value| *value >= min && *value <= max)
                .map(|_| token.to_owned())
        })
    }

    /// Accepts exactly one of `options`.
    #[must_use]
    pub fn one_of(options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let allowed: Vec<String> = options.into_iter().map(Into::into).collect();
        Self::custom(format!("one of {}", allowed.join("/")), move |token| {
            allowed
                .iter()
                .any(|option| option == token)
                .then(|| token.to_owned())
        })
    }

    /// Accepts `true` or `false`.
    #[must_use]
    pub fn boolean() -> Self {
        Self::custom("boolean", |token| {
            matches!(token, "true" | "false").then(|| token.to_owned())
        })
    }

    /// Accepts `<@id>` or `<@!id>` and yields `id`.
    #[must_use]
    pub fn user_mention() -> Self {
        Self::custom("user mention", |token| capture_id(&USER_MENTION, token))
    }

    /// Accepts `<#id>` and yields `id`.
    #[must_use]
    pub fn channel_mention() -> Self {
        Self::custom("channel mention", |token| {
            capture_id(&CHANNEL_MENTION, token)
        })
    }

    /// Returns the human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Validates `token`, returning the accepted value.
    #[must_use]
    pub fn validate(&self, token: &str) -> Option<String> {
        (self.check)(token)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::string()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Validator").field(&self.label).finish()
    }
}

fn parse_float(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|value| !value.is_nan())
}

fn capture_id(pattern: &LazyLock<Option<Regex>>, token: &str) -> Option<String> {
    let regex = pattern.as_ref()?;
    regex
        .captures(token)?
        .name("id")
        .map(|id| id.as_str().to_owned())
}

/// Declarative validator description used by command catalogs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidatorSpec {
    /// See [`Validator::string`].
    #[default]
    String,
    /// See [`Validator::integer`].
    Integer,
    /// See [`Validator::integer_range`].
    IntegerRange {
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },
    /// See [`Validator::float`].
    Float,
    /// See [`Validator::float_range`].
    FloatRange {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// See [`Validator::one_of`].
    OneOf {
        /// Accepted tokens.
        options: Vec<String>,
    },
    /// See [`Validator::boolean`].
    Boolean,
    /// See [`Validator::user_mention`].
    UserMention,
    /// See [`Validator::channel_mention`].
    ChannelMention,
}

impl ValidatorSpec {
    /// Builds the validator described by this spec.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDefinitionError::InvalidValidator`] for empty ranges
    /// and empty option lists.
    pub fn build(&self, argument: &str) -> DefinitionResult<Validator> {
        let invalid = |reason: &str| CommandDefinitionError::InvalidValidator {
            argument: argument.to_owned(),
            reason: reason.to_owned(),
        };
        match self {
            Self::String => Ok(Validator::string()),
            Self::Integer => Ok(Validator::integer()),
            Self::IntegerRange { min, max } if min > max => Err(invalid("min exceeds max")),
            Self::IntegerRange { min, max } => Ok(Validator::integer_range(*min, *max)),
            Self::Float => Ok(Validator::float()),
            Self::FloatRange { min, max } if min.is_nan() || max.is_nan() || min > max => {
                Err(invalid("bounds must be ordered numbers"))
            }
            Self::FloatRange { min, max } => Ok(Validator::float_range(*min, *max)),
            Self::OneOf { options } if options.is_empty() => Err(invalid("no options given")),
            Self::OneOf { options } => Ok(Validator::one_of(options.iter().cloned())),
            Self::Boolean => Ok(Validator::boolean()),
            Self::UserMention => Ok(Validator::user_mention()),
            Self::ChannelMention => Ok(Validator::channel_mention()),
        }
    }
}
