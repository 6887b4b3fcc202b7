//! Listener registry.
//!
//! Per message type, an insertion-ordered table of `id → registration`. Ids
//! are unique within a type's table; registering an existing id replaces the
//! handler in place (it keeps its notification position).
//!
//! Handlers run with no lock held, so they may register or remove listeners,
//! including themselves, while a notification is in flight. [`notify`]
//! iterates a snapshot taken when it starts:
//!
//! - entries removed or replaced by an earlier handler are skipped
//! - entries added during the notification wait for the next one
//!
//! [`notify`]: ListenerRegistry::notify

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;

use crate::errors::{BridgeError, Result};
use crate::token::ListenerId;

/// A registered callback.
pub type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Options for [`ListenerRegistry::register`].
#[derive(Clone, Debug, Default)]
pub struct ListenOptions {
    /// Explicit id; a fresh token is generated when `None`.
    pub id: Option<ListenerId>,
    /// Remove the registration after its first invocation.
    pub once: bool,
    /// Fire only when the inbound token equals the registration id.
    pub match_token: bool,
}

impl ListenOptions {
    /// Default options: generated id, persistent, fires for every token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<ListenerId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Remove after the first invocation.
    #[must_use]
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    /// Fire only for envelopes whose token equals the id.
    #[must_use]
    pub fn match_token(mut self) -> Self {
        self.match_token = true;
        self
    }
}

struct Registration {
    handler: Handler,
    match_token: bool,
    /// Distinguishes a replaced registration from its successor under the
    /// same id.
    seq: u64,
}

#[derive(Default)]
struct Tables {
    by_type: HashMap<String, IndexMap<ListenerId, Registration>>,
    next_seq: u64,
    closed: bool,
}

impl Tables {
    fn remove(&mut self, id: &str) -> bool {
        if self.closed {
            return false;
        }
        let mut removed = false;
        for table in self.by_type.values_mut() {
            removed |= table.shift_remove(id).is_some();
        }
        removed
    }

    fn is_live(&self, message_type: &str, id: &str, seq: u64) -> bool {
        !self.closed
            && self
                .by_type
                .get(message_type)
                .and_then(|table| table.get(id))
                .is_some_and(|reg| reg.seq == seq)
    }
}

/// Per-instance listener tables.
#[derive(Default)]
pub struct ListenerRegistry {
    tables: Arc<Mutex<Tables>>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `message_type` and return its effective id.
    ///
    /// With [`ListenOptions::once`], the id is removed from every type table
    /// right after the first invocation.
    pub fn register<F>(
        &self,
        message_type: impl Into<String>,
        handler: F,
        options: ListenOptions,
    ) -> Result<ListenerId>
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = options.id.unwrap_or_default();
        let handler: Handler = if options.once {
            once_handler(id.clone(), Arc::downgrade(&self.tables), handler)
        } else {
            Arc::new(handler)
        };

        let mut tables = self.tables.lock();
        if tables.closed {
            return Err(BridgeError::Destroyed);
        }
        let seq = tables.next_seq;
        tables.next_seq += 1;
        let message_type = message_type.into();
        tracing::trace!(%id, message_type = %message_type, once = options.once, "registering listener");
        let _ = tables.by_type.entry(message_type).or_default().insert(
            id.clone(),
            Registration {
                handler,
                match_token: options.match_token,
                seq,
            },
        );
        Ok(id)
    }

    /// Remove `id` from every type table. Returns whether anything was
    /// removed; always `false` once the registry is cleared.
    pub fn remove(&self, id: &str) -> bool {
        self.tables.lock().remove(id)
    }

    /// Invoke the handlers for `message_type` that accept `token`, in
    /// registration order. Returns how many ran.
    pub fn notify(&self, message_type: &str, token: Option<&str>, payload: &Value) -> usize {
        let snapshot: Vec<(ListenerId, u64, Handler)> = {
            let tables = self.tables.lock();
            if tables.closed {
                return 0;
            }
            let Some(table) = tables.by_type.get(message_type) else {
                return 0;
            };
            table
                .iter()
                .filter(|(id, reg)| !reg.match_token || token == Some(id.as_str()))
                .map(|(id, reg)| (id.clone(), reg.seq, Arc::clone(&reg.handler)))
                .collect()
        };

        let mut invoked = 0;
        for (id, seq, handler) in snapshot {
            if !self.tables.lock().is_live(message_type, &id, seq) {
                continue;
            }
            handler(payload);
            invoked += 1;
        }
        invoked
    }

    /// Drop every registration and refuse new ones.
    pub fn clear(&self) {
        let drained = {
            let mut tables = self.tables.lock();
            tables.closed = true;
            std::mem::take(&mut tables.by_type)
        };
        // Handlers may own resources whose drop re-enters the registry.
        drop(drained);
    }

    /// Whether [`clear`](Self::clear) has been called.
    pub fn is_closed(&self) -> bool {
        self.tables.lock().closed
    }

    /// Whether `id` is registered under any type.
    pub fn contains(&self, id: &str) -> bool {
        self.tables
            .lock()
            .by_type
            .values()
            .any(|table| table.contains_key(id))
    }

    /// Ids registered for `message_type`, in notification order.
    pub fn listeners_for(&self, message_type: &str) -> Vec<ListenerId> {
        self.tables
            .lock()
            .by_type
            .get(message_type)
            .map(|table| table.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Total number of registrations across all types.
    pub fn len(&self) -> usize {
        self.tables.lock().by_type.values().map(IndexMap::len).sum()
    }

    /// Whether no registrations exist.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn once_handler<F>(id: ListenerId, tables: Weak<Mutex<Tables>>, handler: F) -> Handler
where
    F: Fn(&Value) + Send + Sync + 'static,
{
    let fired = AtomicBool::new(false);
    Arc::new(move |payload: &Value| {
        if fired.swap(true, Ordering::AcqRel) {
            return;
        }
        handler(payload);
        if let Some(tables) = tables.upgrade() {
            let _ = tables.lock().remove(&id);
        }
    })
}
