//! Domain model for command trees.
//!
//! Argument schemas, validators, groups, rate limits and the tree nodes
//! themselves. Nothing here performs I/O.

mod argument;
mod catalog;
mod error;
mod group;
mod node;
mod rate_limit;
mod usage;
mod validator;

pub use argument::{Argument, ArgumentPresence};
pub use catalog::{
    ActionBindings, ArgumentDeclaration, CommandCatalog, CommandDeclaration, GroupDeclaration,
    RateLimitDeclaration,
};
pub use error::{CommandDefinitionError, DefinitionResult, normalise_name};
pub use group::{CommandGroup, DEFAULT_GROUP};
pub use node::{CommandBuilder, CommandExample, CommandHelp, CommandNode, NodeKind};
pub(crate) use node::{ensure_unique_siblings, find_in};
pub use rate_limit::{DEFAULT_THROTTLE_NOTICE, RateLimit, RateLimitController};
pub use usage::{Usage, UsageMismatch};
pub use validator::{Validator, ValidatorFn, ValidatorSpec};
