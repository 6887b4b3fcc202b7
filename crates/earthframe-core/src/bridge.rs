//! Token-correlated request/response over the broadcast channel.
//!
//! The channel has no notion of a reply, so every outbound command carries a
//! fresh [`Token`]. Before transmitting, the bridge registers a one-shot,
//! token-matched listener under that token for the command's type. The first
//! envelope of that type echoing the token resolves the call; replies meant
//! for other outstanding calls of the same type pass it by.
//!
//! There is no timeout. An unanswered call keeps its listener until the
//! registry is cleared, at which point the waiter sees [`BridgeError::Destroyed`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::envelope::Envelope;
use crate::errors::{BridgeError, Result};
use crate::host::Frame;
use crate::registry::{ListenOptions, ListenerRegistry};
use crate::token::Token;

/// Sends correlated commands through a frame.
pub struct Bridge {
    registry: Arc<ListenerRegistry>,
    frame: Arc<dyn Frame>,
}

impl Bridge {
    /// Create a bridge posting into `frame` and listening through `registry`.
    pub fn new(registry: Arc<ListenerRegistry>, frame: Arc<dyn Frame>) -> Self {
        Self { registry, frame }
    }

    /// Whether the outbound transport can take messages.
    pub fn is_attached(&self) -> bool {
        self.frame.is_attached()
    }

    /// Transmit `{type, body, token}` and call `on_reply` with the body of
    /// the matching reply. Returns the token.
    ///
    /// The listener is registered before the envelope goes out. If the
    /// transport refuses the envelope, the listener is withdrawn.
    pub fn correlate<F>(&self, message_type: &str, body: Value, on_reply: F) -> Result<Token>
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let token = Token::new();
        let _ = self.registry.register(
            message_type,
            on_reply,
            ListenOptions::new()
                .with_id(token.clone())
                .once()
                .match_token(),
        )?;

        let envelope = Envelope::new(message_type, body, token.clone());
        if let Err(e) = self.frame.post_message(envelope.to_value()) {
            tracing::warn!(message_type, %token, error = %e, "frame rejected message");
            let _ = self.registry.remove(&token);
            return Err(e.into());
        }
        tracing::debug!(message_type, %token, "sent correlated message");
        Ok(token)
    }

    /// Transmit a command and return a future for its reply body.
    pub fn request(&self, message_type: &str, body: Value) -> Result<PendingReply> {
        let (tx, rx) = oneshot::channel();
        let slot = Mutex::new(Some(tx));
        let token = self.correlate(message_type, body, move |reply| {
            if let Some(tx) = slot.lock().take() {
                let _ = tx.send(reply.clone());
            }
        })?;
        Ok(PendingReply { token, rx })
    }
}

/// The deferred reply to one correlated command.
///
/// Resolves with the reply body, or with [`BridgeError::Destroyed`] if the
/// listener was dropped unanswered.
#[derive(Debug)]
pub struct PendingReply {
    token: Token,
    rx: oneshot::Receiver<Value>,
}

impl PendingReply {
    /// The correlation token carried by the outbound envelope.
    pub fn token(&self) -> &Token {
        &self.token
    }
}

impl Future for PendingReply {
    type Output = Result<Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|reply| reply.map_err(|_| BridgeError::Destroyed))
    }
}
