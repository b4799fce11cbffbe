//! Commands that hold a short conversation with the invoker.

use super::helpers::{ALICE, BOB, GENERAL, bot, general, message, transport};
use async_trait::async_trait;
use parley::command::{
    domain::CommandBuilder,
    ports::{ActionResult, CommandAction},
    services::{CommandRegistry, DispatchOutcome},
};
use parley::interaction::{
    adapters::memory::InMemoryChatTransport,
    services::{CommandContext, PromptOptions},
};
use rstest::{fixture, rstest};
use std::time::Duration;

/// Asks one question and grades the invoker's answer.
struct QuizAction;

#[async_trait]
impl CommandAction for QuizAction {
    async fn run(&self, context: &CommandContext, _arguments: Vec<String>) -> ActionResult<()> {
        let options = PromptOptions::new().with_timeout(Duration::from_secs(5));
        let answer = context.prompt("What is 6 x 7?", &options).await?;
        let verdict = match answer.as_deref() {
            Some("42") => "Correct!",
            Some(_) => "Wrong!",
            None => "Time's up!",
        };
        context.say(verdict).await?;
        Ok(())
    }
}

#[fixture]
fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry
        .register_command(CommandBuilder::new("quiz", "Answer a question").with_action(QuizAction))
        .expect("quiz registers");
    registry
}

#[rstest]
#[tokio::test]
async fn quiz_grades_only_the_invokers_answer(
    transport: InMemoryChatTransport,
    registry: CommandRegistry,
) {
    transport.push_reply(message(BOB, GENERAL, "41"));
    transport.push_reply(message(ALICE, GENERAL, "42"));
    let dispatcher = bot(&transport, registry);

    let outcome = dispatcher
        .handle(&message(ALICE, GENERAL, "!quiz"))
        .await
        .expect("quiz runs");

    assert_eq!(outcome, DispatchOutcome::Handled);
    assert_eq!(
        transport.sent_contents(&general()),
        vec!["What is 6 x 7?".to_owned(), "Correct!".to_owned()]
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn quiz_gives_up_when_nobody_answers(
    transport: InMemoryChatTransport,
    registry: CommandRegistry,
) {
    let dispatcher = bot(&transport, registry);

    dispatcher
        .handle(&message(ALICE, GENERAL, "!quiz"))
        .await
        .expect("quiz runs");

    assert_eq!(
        transport.sent_contents(&general()).last().map(String::as_str),
        Some("Time's up!")
    );
}

#[rstest]
#[tokio::test]
async fn answers_in_other_channels_are_not_taken(
    transport: InMemoryChatTransport,
    registry: CommandRegistry,
) {
    transport.push_reply(message(ALICE, "elsewhere", "42"));
    transport.push_reply(message(ALICE, GENERAL, "12"));
    let dispatcher = bot(&transport, registry);

    dispatcher
        .handle(&message(ALICE, GENERAL, "!quiz"))
        .await
        .expect("quiz runs");

    assert_eq!(
        transport.sent_contents(&general()).last().map(String::as_str),
        Some("Wrong!")
    );
}
