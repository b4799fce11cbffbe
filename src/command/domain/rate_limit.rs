//! Sliding-window rate limiting.
//!
//! Each key keeps the timestamps of its accepted hits, oldest first. A hit is
//! accepted while fewer than `max_hits` timestamps remain inside the trailing
//! window. Stale timestamps are pruned lazily on every hit and query.

use minijinja::{Environment, context};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{CommandDefinitionError, DefinitionResult};

/// Throttle notice used when a command does not declare its own.
pub const DEFAULT_THROTTLE_NOTICE: &str =
    "You're doing that too fast. Try again in {{ seconds }} second(s).";

/// Fixed-capacity sliding-window hit counter keyed by caller identity.
#[derive(Debug)]
pub struct RateLimitController {
    window_ms: i64,
    max_hits: u32,
    store: Mutex<HashMap<String, VecDeque<i64>>>,
}

impl RateLimitController {
    /// Creates a controller allowing `max_hits` per `window`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDefinitionError::InvalidRateLimit`] when `max_hits`
    /// is zero.
    pub fn new(window: Duration, max_hits: u32) -> DefinitionResult<Self> {
        if max_hits < 1 {
            return Err(CommandDefinitionError::InvalidRateLimit(max_hits));
        }
        Ok(Self {
            window_ms: i64::try_from(window.as_millis()).unwrap_or(i64::MAX),
            max_hits,
            store: Mutex::new(HashMap::new()),
        })
    }

    /// Returns the window length in milliseconds.
    #[must_use]
    pub const fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Returns the number of hits allowed per window.
    #[must_use]
    pub const fn max_hits(&self) -> u32 {
        self.max_hits
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, VecDeque<i64>>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a hit for `key` at `now_ms` if the budget allows it.
    ///
    /// Returns `false` without recording anything when the key already has
    /// `max_hits` timestamps inside the window.
    pub fn hit(&self, key: &str, now_ms: i64) -> bool {
        let mut store = self.lock();
        prune(&mut store, now_ms.saturating_sub(self.window_ms));
        let hits = store.entry(key.to_owned()).or_default();
        if hits.len() >= self.budget() {
            return false;
        }
        hits.push_back(now_ms);
        true
    }

    /// Returns the milliseconds until `key` may hit again.
    ///
    /// Zero while the key is under budget; never negative.
    #[must_use]
    pub fn ms_remaining(&self, key: &str, now_ms: i64) -> i64 {
        let mut store = self.lock();
        prune(&mut store, now_ms.saturating_sub(self.window_ms));
        let Some(hits) = store.get(key) else {
            return 0;
        };
        if hits.len() < self.budget() {
            return 0;
        }
        hits.front().map_or(0, |oldest| {
            oldest
                .saturating_add(self.window_ms)
                .saturating_sub(now_ms)
                .max(0)
        })
    }

    /// Returns the number of keys currently holding timestamps.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    fn budget(&self) -> usize {
        usize::try_from(self.max_hits).unwrap_or(usize::MAX)
    }
}

/// Drops every timestamp older than `min_time`; empty keys are removed.
fn prune(store: &mut HashMap<String, VecDeque<i64>>, min_time: i64) {
    store.retain(|_, hits| {
        let stale = hits.partition_point(|timestamp| *timestamp < min_time);
        hits.drain(..stale);
        !hits.is_empty()
    });
}

/// A rate limit attached to a command, with its throttle notice.
#[derive(Debug)]
pub struct RateLimit {
    controller: RateLimitController,
    notice_template: String,
}

impl RateLimit {
    /// Creates a rate limit with the default throttle notice.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDefinitionError::InvalidRateLimit`] when `max_hits`
    /// is zero.
    pub fn new(window: Duration, max_hits: u32) -> DefinitionResult<Self> {
        Ok(Self {
            controller: RateLimitController::new(window, max_hits)?,
            notice_template: DEFAULT_THROTTLE_NOTICE.to_owned(),
        })
    }

    /// Replaces the throttle notice template.
    ///
    /// The template is rendered with `minijinja` and receives `seconds`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandDefinitionError::InvalidNoticeTemplate`] when the
    /// template does not compile.
    pub fn with_notice(mut self, template: impl Into<String>) -> DefinitionResult<Self> {
        let source = template.into();
        Environment::new()
            .template_from_str(&source)
            .map_err(|error| CommandDefinitionError::InvalidNoticeTemplate(error.to_string()))?;
        self.notice_template = source;
        Ok(self)
    }

    /// Returns the hit counter.
    #[must_use]
    pub const fn controller(&self) -> &RateLimitController {
        &self.controller
    }

    /// Returns the throttle notice template source.
    #[must_use]
    pub fn notice_template(&self) -> &str {
        &self.notice_template
    }

    /// Renders the throttle notice for a wait of `ms_remaining`.
    ///
    /// Seconds are rounded up so the notice never promises too early.
    ///
    /// # Errors
    ///
    /// Returns the `minijinja` error when rendering fails.
    pub fn render_notice(&self, ms_remaining: i64) -> Result<String, minijinja::Error> {
        let seconds = u64::try_from(ms_remaining).unwrap_or(0).div_ceil(1000);
        Environment::new().render_str(&self.notice_template, context! { seconds })
    }
}
