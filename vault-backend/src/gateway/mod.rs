//! Gateway: pushes vault file events to connected browser viewers.

pub mod actix_ws;
pub mod events;
pub mod protocol;

pub use events::EventBroadcaster;
pub use protocol::{FileEventKind, GatewayMessage};
