//! Inbound router: validates raw channel traffic and hands envelopes to the
//! registry.
//!
//! The window channel is shared with unrelated senders, so anything that is
//! not a well-formed envelope is dropped without a trace.

use std::sync::Arc;

use serde_json::Value;

use crate::envelope::InboundRef;
use crate::registry::ListenerRegistry;

/// Routes inbound messages to the handlers of one registry.
pub struct Router {
    registry: Arc<ListenerRegistry>,
}

impl Router {
    /// Create a router over `registry`.
    pub fn new(registry: Arc<ListenerRegistry>) -> Self {
        Self { registry }
    }

    /// Route one raw message. Returns the number of handlers invoked.
    pub fn route(&self, raw: &Value) -> usize {
        let Some(envelope) = InboundRef::parse(raw) else {
            return 0;
        };
        self.registry
            .notify(envelope.message_type, envelope.token, envelope.body)
    }
}
