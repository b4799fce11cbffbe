//! Adapter implementations for the interaction ports.

pub mod memory;
