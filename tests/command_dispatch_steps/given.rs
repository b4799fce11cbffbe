//! Given steps for command dispatch BDD scenarios.

use super::world::DispatchWorld;
use eyre::WrapErr;
use parley::command::{
    domain::{Argument, CommandBuilder, RateLimit},
    services::{CommandRegistry, builtin},
};
use rstest_bdd_macros::given;
use std::time::Duration;

#[given("a bot with the built-in commands")]
fn bot_with_built_ins(world: &mut DispatchWorld) -> Result<(), eyre::Report> {
    let mut registry = CommandRegistry::new();
    builtin::register_defaults(&mut registry).wrap_err("register built-in commands")?;
    world.registry = registry;
    Ok(())
}

#[given("a git command with add, commit and push subcommands")]
fn git_command(world: &mut DispatchWorld) -> Result<(), eyre::Report> {
    let recorder = world.recorder.clone();
    let git = CommandBuilder::new("git", "Version control")
        .with_subcommand(
            CommandBuilder::new("add", "Stage files")
                .with_argument(Argument::new("files").optional("."))
                .with_action(recorder.clone()),
        )
        .with_subcommand(
            CommandBuilder::new("commit", "Record changes")
                .with_argument(Argument::new("commit_message").multi())
                .with_action(recorder.clone()),
        )
        .with_subcommand(CommandBuilder::new("push", "Upload changes").with_action(recorder));
    world
        .registry
        .register_command(git)
        .wrap_err("register git command")?;
    Ok(())
}

#[given(r#"a command "{name}" limited to {max:u32} uses per {seconds:u64} seconds"#)]
fn rate_limited_command(
    world: &mut DispatchWorld,
    name: String,
    max: u32,
    seconds: u64,
) -> Result<(), eyre::Report> {
    let limit =
        RateLimit::new(Duration::from_secs(seconds), max).wrap_err("build rate limit")?;
    let command = CommandBuilder::new(name, "Rate limited command")
        .with_rate_limit(limit)
        .with_action(world.recorder.clone());
    world
        .registry
        .register_command(command)
        .wrap_err("register rate limited command")?;
    Ok(())
}
