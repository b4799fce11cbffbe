//! In-memory adapter implementations for testing.
//!
//! These adapters provide simple, thread-safe implementations suitable for
//! unit testing and local runs without a chat platform connection.

mod transport;

pub use transport::InMemoryChatTransport;
