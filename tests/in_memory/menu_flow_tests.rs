//! Commands that open reaction menus.

use super::helpers::{ALICE, BOB, GENERAL, bot, general, message, transport};
use async_trait::async_trait;
use parley::command::{
    domain::{Argument, CommandBuilder},
    ports::{ActionError, ActionResult, CommandAction},
    services::{CommandError, CommandRegistry, DispatchOutcome},
};
use parley::interaction::{
    adapters::memory::InMemoryChatTransport,
    domain::{ChannelId, MessageHandle, ReactionEvent, UserId},
    ports::{ChatTransport, TransportError, TransportResult},
    services::{CommandContext, MenuError, MenuHandler, MenuTermination, ReactionOutcome},
};
use rstest::{fixture, rstest};
use std::collections::BTreeMap;

const VOTES: [&str; 2] = ["👍", "👎"];

/// Counts votes and publishes the result when the poll closes.
#[derive(Debug, Default)]
struct Tally {
    counts: BTreeMap<String, u32>,
}

impl Tally {
    fn summary(&self) -> String {
        self.counts
            .iter()
            .map(|(emoji, count)| format!("{emoji} {count}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[async_trait]
impl MenuHandler for Tally {
    async fn on_reaction(
        &mut self,
        transport: &dyn ChatTransport,
        message: &MessageHandle,
        reaction: &ReactionEvent,
    ) -> TransportResult<ReactionOutcome> {
        *self.counts.entry(reaction.emoji.clone()).or_default() += 1;
        transport
            .edit_message(message, &format!("Votes so far: {}", self.summary()))
            .await?;
        Ok(ReactionOutcome::Continue)
    }

    async fn on_finish(
        &mut self,
        transport: &dyn ChatTransport,
        message: &MessageHandle,
        termination: &MenuTermination,
    ) -> TransportResult<()> {
        if matches!(termination, MenuTermination::Failed(_)) {
            return Ok(());
        }
        transport
            .edit_message(message, &format!("Poll closed: {}", self.summary()))
            .await?;
        Ok(())
    }
}

/// Opens a three-vote poll on the question in its argument.
struct PollAction;

#[async_trait]
impl CommandAction for PollAction {
    async fn run(&self, context: &CommandContext, arguments: Vec<String>) -> ActionResult<()> {
        let question = arguments.first().cloned().unwrap_or_default();
        let poll = context.say(&format!("Poll: {question}")).await?;
        let report = context
            .create_menu(
                poll,
                VOTES,
                Tally::default(),
                context.menu_options().with_max_total_reactions(3),
            )
            .run()
            .await?;
        context
            .say(&format!("{} votes counted", report.rounds))
            .await?;
        Ok(())
    }
}

#[fixture]
fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry
        .register_command(
            CommandBuilder::new("poll", "Run a quick poll")
                .with_argument(Argument::new("question").multi())
                .with_action(PollAction),
        )
        .expect("poll registers");
    registry
}

#[rstest]
#[tokio::test]
async fn poll_counts_human_votes_and_closes(
    transport: InMemoryChatTransport,
    registry: CommandRegistry,
) {
    transport.push_reaction("👍", transport.bot_user());
    transport.push_reaction("👍", UserId::new(ALICE));
    transport.push_reaction("🎉", UserId::new(BOB));
    transport.push_reaction("👎", UserId::new(BOB));
    transport.push_reaction("👍", UserId::new(BOB));
    let dispatcher = bot(&transport, registry);

    let outcome = dispatcher
        .handle(&message(ALICE, GENERAL, "!poll Pizza tonight?"))
        .await
        .expect("poll runs");

    assert_eq!(outcome, DispatchOutcome::Handled);
    assert_eq!(
        transport.sent_contents(&general()),
        vec!["Poll: Pizza tonight?".to_owned(), "3 votes counted".to_owned()]
    );
    let poll = transport
        .sent_messages()
        .first()
        .and_then(|sent| transport.message(sent.id()))
        .expect("poll message is live");
    assert_eq!(poll.content(), "Poll closed: 👍 2, 👎 1");
    assert_eq!(transport.removed_reactions().len(), 3);
}

#[rstest]
#[tokio::test]
async fn poll_fails_where_reactions_are_forbidden(
    transport: InMemoryChatTransport,
    registry: CommandRegistry,
) {
    let quiet = ChannelId::new("announcements");
    transport.forbid_reactions(quiet.clone());
    let dispatcher = bot(&transport, registry);

    let error = dispatcher
        .handle(&message(ALICE, quiet.as_str(), "!poll Anyone?"))
        .await
        .expect_err("menu cannot start");

    assert!(matches!(
        error,
        CommandError::Action {
            source: ActionError::Menu(MenuError::Start(TransportError::Forbidden { .. })),
            ..
        }
    ));
    assert_eq!(transport.sent_contents(&quiet), vec!["Poll: Anyone?".to_owned()]);
}
