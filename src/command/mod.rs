//! Command trees, registration and dispatch.
//!
//! The module follows the crate's hexagonal layout:
//!
//! - Domain types in [`domain`]: argument schemas, validators, nodes, groups
//!   and rate limits
//! - Port contracts in [`ports`]: the run action invoked by leaf commands
//! - Orchestration services in [`services`]: the registry, node execution,
//!   the dispatcher and the built-in commands

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
