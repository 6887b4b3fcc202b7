//! Bridge error types.

use thiserror::Error;

/// Errors from constructing or talking to an embedded frame.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The container meant to host the frame does not exist.
    #[error("container not found: {container}")]
    ContainerNotFound {
        /// The container id (or element description) that was looked up.
        container: String,
    },

    /// The instance has been torn down.
    #[error("embedded frame has been destroyed")]
    Destroyed,

    /// The outbound transport refused a message.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// An outbound body could not be serialised.
    #[error("failed to encode '{message_type}' body: {source}")]
    Encode {
        /// The message type being sent.
        message_type: String,
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },

    /// A reply or event body did not match its declared shape.
    #[error("failed to decode '{message_type}' payload: {source}")]
    Decode {
        /// The message type being decoded.
        message_type: String,
        /// Underlying deserialisation error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised by a [`Frame`](crate::host::Frame) when posting a message.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The frame's document is gone (removed or never loaded).
    #[error("frame is detached")]
    Detached,

    /// The receiving side closed its end of the channel.
    #[error("channel closed: {0}")]
    Closed(String),
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
