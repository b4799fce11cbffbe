//! Then steps for command dispatch BDD scenarios.

use super::world::{CHANNEL, DispatchWorld};
use parley::command::services::DispatchOutcome;
use parley::interaction::domain::ChannelId;
use rstest_bdd_macros::then;

const fn outcome_name(outcome: DispatchOutcome) -> &'static str {
    match outcome {
        DispatchOutcome::Ignored => "ignored",
        DispatchOutcome::NotFound => "not found",
        DispatchOutcome::Denied(_) => "denied",
        DispatchOutcome::Handled => "handled",
        DispatchOutcome::Rejected => "rejected",
    }
}

#[then(r#"the outcome is "{expected}""#)]
fn outcome_is(world: &DispatchWorld, expected: String) -> Result<(), eyre::Report> {
    let result = world
        .last_outcome
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no message has been dispatched"))?;
    let outcome = result
        .as_ref()
        .map_err(|err| eyre::eyre!("dispatch failed: {err}"))?;
    let actual = outcome_name(*outcome);
    if actual != expected {
        return Err(eyre::eyre!("expected outcome {expected}, found {actual}"));
    }
    Ok(())
}

#[then(r#"the last reply starts with "{prefix}""#)]
fn last_reply_starts_with(world: &DispatchWorld, prefix: String) -> Result<(), eyre::Report> {
    let replies = world.transport.sent_contents(&ChannelId::new(CHANNEL));
    let last = replies
        .last()
        .ok_or_else(|| eyre::eyre!("the bot has not replied"))?;
    if !last.starts_with(&prefix) {
        return Err(eyre::eyre!("expected reply starting with {prefix:?}, found {last:?}"));
    }
    Ok(())
}

#[then(r#"the recorded arguments are "{arguments}""#)]
fn recorded_arguments(world: &DispatchWorld, arguments: String) -> Result<(), eyre::Report> {
    let call = world
        .recorder
        .last_call()
        .ok_or_else(|| eyre::eyre!("no command action ran"))?;
    let joined = call.join(" | ");
    if joined != arguments {
        return Err(eyre::eyre!("expected arguments {arguments:?}, found {joined:?}"));
    }
    Ok(())
}

fn shutdown_triggered(world: &DispatchWorld) -> Result<bool, eyre::Report> {
    world
        .dispatcher
        .as_ref()
        .map(|dispatcher| dispatcher.shutdown().is_triggered())
        .ok_or_else(|| eyre::eyre!("no dispatcher has been built"))
}

#[then("the shutdown signal has been triggered")]
fn shutdown_has_been_triggered(world: &DispatchWorld) -> Result<(), eyre::Report> {
    if !shutdown_triggered(world)? {
        return Err(eyre::eyre!("expected the shutdown signal to be triggered"));
    }
    Ok(())
}

#[then("the shutdown signal has not been triggered")]
fn shutdown_has_not_been_triggered(world: &DispatchWorld) -> Result<(), eyre::Report> {
    if shutdown_triggered(world)? {
        return Err(eyre::eyre!("expected the shutdown signal to stay untriggered"));
    }
    Ok(())
}
