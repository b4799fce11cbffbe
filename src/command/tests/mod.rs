//! Unit tests for the command module.
//!
//! Covers usage matching, validators, rate limits, tree construction,
//! registration, node execution, catalogs and the dispatcher.
