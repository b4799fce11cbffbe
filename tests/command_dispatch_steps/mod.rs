//! Step definitions for command dispatch scenarios.

pub mod world;

mod given;
mod then;
mod when;
