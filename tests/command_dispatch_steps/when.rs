//! When steps for command dispatch BDD scenarios.

use super::world::{DispatchWorld, run_async};
use rstest_bdd_macros::when;

fn dispatch(world: &mut DispatchWorld, user: &str, text: &str) {
    let message = DispatchWorld::message_from(user, text);
    let outcome = run_async(world.dispatcher().handle(&message));
    world.last_outcome = Some(outcome);
}

#[when(r#""{user}" sends "{text}""#)]
fn user_sends(world: &mut DispatchWorld, user: String, text: String) {
    dispatch(world, &user, &text);
}

#[when(r#""{user}" repeats "{text}" {times:usize} times"#)]
fn user_repeats(world: &mut DispatchWorld, user: String, text: String, times: usize) {
    for _ in 0..times {
        dispatch(world, &user, &text);
    }
}
