//! Bot configuration and JSON file loading.
//!
//! Configuration files are read through a capability-scoped directory handle
//! so callers decide which part of the filesystem the bot may see.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::interaction::domain::UserId;

const DEFAULT_PREFIX: &str = "!";
const DEFAULT_PROMPT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MENU_TIMEOUT_SECS: u64 = 60;
const DEFAULT_THROTTLE_NOTICE_TTL_SECS: u64 = 5;

/// Errors raised while loading configuration or catalog files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be opened or read.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// Path relative to the configuration directory.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file content is not valid JSON for the expected shape.
    #[error("failed to parse '{path}': {source}")]
    Parse {
        /// Path relative to the configuration directory, or `<inline>`.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The command prefix is empty or contains whitespace.
    #[error("invalid command prefix '{0}': must be non-empty and contain no whitespace")]
    InvalidPrefix(String),
}

/// Runtime settings for a bot instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_prefix")]
    prefix: String,
    owner: UserId,
    #[serde(default = "default_register_defaults")]
    register_defaults: bool,
    #[serde(default = "default_prompt_timeout_secs")]
    prompt_timeout_secs: u64,
    #[serde(default = "default_menu_timeout_secs")]
    menu_timeout_secs: u64,
    #[serde(default = "default_throttle_notice_ttl_secs")]
    throttle_notice_ttl_secs: u64,
}

impl BotConfig {
    /// Creates a configuration with default settings for `owner`.
    #[must_use]
    pub fn new(owner: UserId) -> Self {
        Self {
            prefix: default_prefix(),
            owner,
            register_defaults: default_register_defaults(),
            prompt_timeout_secs: DEFAULT_PROMPT_TIMEOUT_SECS,
            menu_timeout_secs: DEFAULT_MENU_TIMEOUT_SECS,
            throttle_notice_ttl_secs: DEFAULT_THROTTLE_NOTICE_TTL_SECS,
        }
    }

    /// Sets the command prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrefix`] when the prefix is empty or
    /// contains whitespace.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Result<Self, ConfigError> {
        self.prefix = prefix.into();
        self.validate()?;
        Ok(self)
    }

    /// Enables or disables registration of the built-in commands.
    #[must_use]
    pub const fn with_register_defaults(mut self, register_defaults: bool) -> Self {
        self.register_defaults = register_defaults;
        self
    }

    /// Sets the prompt timeout in seconds.
    #[must_use]
    pub const fn with_prompt_timeout_secs(mut self, seconds: u64) -> Self {
        self.prompt_timeout_secs = seconds;
        self
    }

    /// Sets the reaction menu timeout in seconds.
    #[must_use]
    pub const fn with_menu_timeout_secs(mut self, seconds: u64) -> Self {
        self.menu_timeout_secs = seconds;
        self
    }

    /// Sets how long throttle notices stay visible, in seconds.
    #[must_use]
    pub const fn with_throttle_notice_ttl_secs(mut self, seconds: u64) -> Self {
        self.throttle_notice_ttl_secs = seconds;
        self
    }

    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::InvalidPrefix`] for an unusable prefix.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_owned(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed or
    /// validated.
    pub fn load(dir: &Dir, path: &Utf8Path) -> Result<Self, ConfigError> {
        let config: Self = read_json(dir, path)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix.is_empty() || self.prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidPrefix(self.prefix.clone()));
        }
        Ok(())
    }

    /// Returns the command prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the owner account.
    #[must_use]
    pub const fn owner(&self) -> &UserId {
        &self.owner
    }

    /// Returns `true` when the built-in commands should be registered.
    #[must_use]
    pub const fn register_defaults(&self) -> bool {
        self.register_defaults
    }

    /// Returns the default time a prompt waits for an answer.
    #[must_use]
    pub const fn prompt_timeout(&self) -> Duration {
        Duration::from_secs(self.prompt_timeout_secs)
    }

    /// Returns the default time a reaction menu waits per round.
    #[must_use]
    pub const fn menu_timeout(&self) -> Duration {
        Duration::from_secs(self.menu_timeout_secs)
    }

    /// Returns how long a throttle notice stays before it is deleted.
    #[must_use]
    pub const fn throttle_notice_ttl(&self) -> Duration {
        Duration::from_secs(self.throttle_notice_ttl_secs)
    }
}

/// Opens `path` as a configuration directory using ambient authority.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the directory cannot be opened.
pub fn open_config_dir(path: &Utf8Path) -> Result<Dir, ConfigError> {
    Dir::open_ambient_dir(path, ambient_authority()).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })
}

/// Reads and deserialises a JSON file relative to `dir`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] or [`ConfigError::Parse`].
pub fn read_json<T>(dir: &Dir, path: &Utf8Path) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let raw = dir.read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_owned()
}

const fn default_register_defaults() -> bool {
    true
}

const fn default_prompt_timeout_secs() -> u64 {
    DEFAULT_PROMPT_TIMEOUT_SECS
}

const fn default_menu_timeout_secs() -> u64 {
    DEFAULT_MENU_TIMEOUT_SECS
}

const fn default_throttle_notice_ttl_secs() -> u64 {
    DEFAULT_THROTTLE_NOTICE_TTL_SECS
}
