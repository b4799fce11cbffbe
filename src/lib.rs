//! Parley: a text-command interpreter for chat bots.
//!
//! Given a raw line of chat text, parley resolves a possibly nested command,
//! validates its arguments against a declared schema, enforces per-user rate
//! limits and can drive short interactive exchanges (prompts and
//! reaction-driven menus) with the invoking user.
//!
//! # Architecture
//!
//! Parley follows hexagonal architecture principles:
//!
//! - **Domain**: Pure command and message models with no I/O
//! - **Ports**: Abstract trait interfaces for the chat platform and command
//!   behaviour
//! - **Adapters**: Concrete implementations of ports (an in-memory chat
//!   transport)
//!
//! # Modules
//!
//! - [`command`]: Command trees, usage matching, rate limits and dispatch
//! - [`interaction`]: Chat transport port, invocation context and reaction
//!   menus
//! - [`config`]: Bot configuration loading

pub mod command;
pub mod config;
pub mod interaction;
