//! Port contracts for command behaviour.

mod action;

pub use action::{ActionError, ActionResult, CommandAction, FnAction, action_fn};
