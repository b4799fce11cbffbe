//! `ping`: liveness check.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

use crate::command::domain::CommandBuilder;
use crate::command::ports::{ActionResult, CommandAction};
use crate::interaction::services::CommandContext;

/// Replies sent by `ping`; `{}` is replaced with a mention of the invoker.
pub const PONG_REPLIES: [&str; 4] = [
    "Pong!",
    "Yes, I'm still alive",
    "What's up, {}?",
    "Hwwapinggg!",
];

/// Answers with one of [`PONG_REPLIES`], picked at random.
#[derive(Debug)]
pub struct PingAction {
    rng: Mutex<StdRng>,
}

impl PingAction {
    /// Creates an action seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates an action drawing replies from `rng`.
    #[must_use]
    pub const fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn next_reply(&self) -> &'static str {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        pong_reply(&mut *rng)
    }
}

impl Default for PingAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandAction for PingAction {
    async fn run(&self, context: &CommandContext, _arguments: Vec<String>) -> ActionResult<()> {
        let reply = self
            .next_reply()
            .replace("{}", &format!("<@{}>", context.author()));
        context.say(&reply).await?;
        Ok(())
    }
}

/// Picks a reply from [`PONG_REPLIES`].
#[must_use]
pub fn pong_reply<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    PONG_REPLIES.choose(rng).copied().unwrap_or("Pong!")
}

pub(super) fn command() -> CommandBuilder {
    CommandBuilder::new("ping", "Check if the bot is alive")
        .in_group(super::UTIL_GROUP)
        .with_details("Ping the bot to check if the bot is still alive")
        .dm_allowed()
        .with_action(PingAction::new())
}
