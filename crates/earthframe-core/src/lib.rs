//! # earthframe-core
//!
//! Bridge to a map application embedded in a framed document.
//!
//! The only link to the embedded application is a window-level broadcast
//! channel: one send primitive, one receive event, no replies. This crate
//! builds a request/response protocol on top of it:
//!
//! - **Tokens**: [`Token`], short random correlation strings
//! - **Registry**: [`ListenerRegistry`], per-type listener tables that tolerate
//!   mutation during dispatch
//! - **Router**: [`Router`], validates inbound traffic and notifies listeners
//! - **Bridge**: [`Bridge`], token-correlated commands with deferred replies
//! - **Lifecycle**: [`EarthFrame`], mounting, the `initial`/`mapConfig`
//!   handshake, readiness, teardown
//! - **Host**: [`Host`]/[`Frame`] traits for the page environment, with an
//!   in-memory implementation in [`host::memory`]
//!
//! Message names and payload shapes come from a protocol catalog through the
//! [`Command`] and [`Event`] traits; this crate routes them by name only.

#![deny(unsafe_code)]

pub mod bridge;
pub mod envelope;
pub mod errors;
pub mod host;
pub mod lifecycle;
pub mod logging;
pub mod message;
pub mod registry;
pub mod router;
pub mod token;

pub use bridge::{Bridge, PendingReply};
pub use envelope::Envelope;
pub use errors::{BridgeError, Result, TransportError};
pub use host::{Container, ElementHandle, Frame, FrameSpec, Host};
pub use lifecycle::{
    CONFIG_COMMAND, ConnectionState, DEFAULT_BASE_URL, EarthFrame, FrameOptions, READY_EVENT,
};
pub use message::{Command, Event};
pub use registry::{ListenOptions, ListenerRegistry};
pub use router::Router;
pub use token::{ListenerId, Token};
