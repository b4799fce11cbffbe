//! Domain values for chat interactions.
//!
//! These types carry no transport behaviour; adapters translate platform
//! events into them.

mod ids;
mod message;

pub use ids::{ChannelId, MessageId, UserId};
pub use message::{MessageHandle, ReactionEvent};
