//! Command services: registry, execution and dispatch.

pub mod builtin;
mod dispatcher;
mod error;
mod execution;
mod registry;

pub use dispatcher::{DenialReason, DispatchOutcome, Dispatcher, MessageGate};
pub use error::{CommandError, CommandResult};
pub use execution::{branch_usage_message, leaf_usage_message};
pub use registry::CommandRegistry;
