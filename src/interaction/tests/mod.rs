//! Unit tests for the interaction module.
//!
//! Covers the in-memory transport, the reaction menu state machine and the
//! prompts offered by the invocation context.

mod fixtures;
