//! Traits binding a message type name to its payload shapes.
//!
//! The core routes JSON by type name only. A protocol catalog implements
//! these traits so callers get typed bodies, replies, and event payloads.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// An outbound command sent to the embedded application.
///
/// The implementing type is the command body. The embedded side acknowledges
/// with an envelope of the same type name carrying [`Command::Response`].
pub trait Command: Serialize {
    /// Wire name of the command.
    const TYPE: &'static str;

    /// Shape of the acknowledgment body.
    type Response: DeserializeOwned;
}

/// An inbound event emitted by the embedded application.
pub trait Event {
    /// Wire name of the event.
    const TYPE: &'static str;

    /// Shape of the event body.
    type Payload: DeserializeOwned;
}
