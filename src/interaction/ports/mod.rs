//! Port trait definitions for chat interactions.

pub mod transport;

pub use transport::{ChatTransport, ReactionFilter, ReplyFilter, TransportError, TransportResult};
