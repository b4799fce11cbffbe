//! Interactive exchanges with the invoking user.
//!
//! This module owns the boundary to the chat platform and the short-lived
//! conversations a command may open after it runs: prompts waiting for a
//! reply and reaction menus.
//!
//! # Architecture
//!
//! - **Domain**: identifiers, message handles and reaction events
//!   ([`domain`])
//! - **Ports**: the [`ports::ChatTransport`] capability
//! - **Adapters**: [`adapters::memory::InMemoryChatTransport`]
//! - **Services**: [`services::CommandContext`] and
//!   [`services::ReactionMenu`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
