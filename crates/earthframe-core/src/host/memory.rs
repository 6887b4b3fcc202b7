//! In-process page: named containers, frames backed by channels, and a
//! synchronous window broadcast.
//!
//! Each mounted frame gets a [`RemoteApp`] that plays the embedded
//! application: it reads what the bridge posts into the frame and broadcasts
//! replies and events on the window channel, where every subscriber sees them.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;

use super::{Container, ElementHandle, Frame, FrameSpec, Host, MessageListener, SubscriptionId};
use crate::envelope::Envelope;
use crate::errors::TransportError;
use crate::lifecycle::READY_EVENT;

/// The window-level broadcast channel.
#[derive(Default)]
struct WindowChannel {
    subscribers: Mutex<IndexMap<SubscriptionId, MessageListener>>,
    next_id: AtomicU64,
}

impl WindowChannel {
    fn subscribe(&self, listener: MessageListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let _ = self.subscribers.lock().insert(id, listener);
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let _ = self.subscribers.lock().shift_remove(&id);
    }

    /// Deliver `message` to every current subscriber. Listeners run without
    /// the subscriber lock held.
    fn post(&self, message: &Value) -> usize {
        let listeners: Vec<MessageListener> =
            self.subscribers.lock().values().cloned().collect();
        for listener in &listeners {
            listener(message);
        }
        listeners.len()
    }

    fn len(&self) -> usize {
        self.subscribers.lock().len()
    }
}

#[derive(Default)]
struct Page {
    containers: HashSet<String>,
    frames: Vec<Arc<MemoryFrame>>,
    remotes: VecDeque<RemoteApp>,
}

/// An in-memory [`Host`].
#[derive(Default)]
pub struct MemoryHost {
    window: Arc<WindowChannel>,
    page: Mutex<Page>,
}

impl MemoryHost {
    /// An empty page with no containers.
    pub fn new() -> Self {
        Self::default()
    }

    /// A page holding the given container ids.
    pub fn with_containers<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let host = Self::new();
        for id in ids {
            host.add_container(id);
        }
        host
    }

    /// Add a container element with the given id.
    pub fn add_container(&self, id: impl Into<String>) {
        let _ = self.page.lock().containers.insert(id.into());
    }

    /// Broadcast an arbitrary message on the window channel. Returns the
    /// number of subscribers reached.
    pub fn post_to_window(&self, message: &Value) -> usize {
        self.window.post(message)
    }

    /// Take the remote end of the oldest frame not yet claimed.
    pub fn take_remote(&self) -> Option<RemoteApp> {
        self.page.lock().remotes.pop_front()
    }

    /// Every frame mounted so far, removed ones included.
    pub fn frames(&self) -> Vec<Arc<MemoryFrame>> {
        self.page.lock().frames.clone()
    }

    /// Number of live window subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.window.len()
    }
}

impl Host for MemoryHost {
    fn resolve_container(&self, container: &Container) -> Option<ElementHandle> {
        match container {
            Container::Element(el) => Some(el.clone()),
            Container::Id(id) => self
                .page
                .lock()
                .containers
                .contains(id)
                .then(|| ElementHandle::new(id.clone())),
        }
    }

    fn mount_frame(&self, container: &ElementHandle, spec: &FrameSpec) -> Arc<dyn Frame> {
        let (tx, rx) = mpsc::unbounded_channel();
        let frame = Arc::new(MemoryFrame {
            container: container.clone(),
            spec: spec.clone(),
            outbox: Mutex::new(Some(tx)),
            attached: AtomicBool::new(true),
            posted: AtomicUsize::new(0),
        });
        let remote = RemoteApp {
            inbox: rx,
            window: Arc::clone(&self.window),
            frame: Arc::clone(&frame),
        };
        let mut page = self.page.lock();
        page.frames.push(Arc::clone(&frame));
        page.remotes.push_back(remote);
        frame
    }

    fn subscribe(&self, listener: MessageListener) -> SubscriptionId {
        self.window.subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.window.unsubscribe(id);
    }
}

/// A frame mounted in a [`MemoryHost`].
pub struct MemoryFrame {
    container: ElementHandle,
    spec: FrameSpec,
    outbox: Mutex<Option<mpsc::UnboundedSender<Value>>>,
    attached: AtomicBool,
    posted: AtomicUsize,
}

impl MemoryFrame {
    /// The element the frame was mounted in.
    pub fn container(&self) -> &ElementHandle {
        &self.container
    }

    /// How the frame was created.
    pub fn spec(&self) -> &FrameSpec {
        &self.spec
    }

    /// Number of messages accepted by [`Frame::post_message`].
    pub fn posted_count(&self) -> usize {
        self.posted.load(Ordering::SeqCst)
    }

    /// Simulate the document unloading while the frame stays in the page.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }
}

impl Frame for MemoryFrame {
    fn post_message(&self, message: Value) -> Result<(), TransportError> {
        if !self.is_attached() {
            return Err(TransportError::Detached);
        }
        let outbox = self.outbox.lock();
        let tx = outbox.as_ref().ok_or(TransportError::Detached)?;
        tx.send(message)
            .map_err(|_| TransportError::Closed("remote inbox dropped".into()))?;
        let _ = self.posted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    fn remove(&self) {
        self.attached.store(false, Ordering::SeqCst);
        drop(self.outbox.lock().take());
    }
}

/// The embedded application's side of a [`MemoryFrame`].
pub struct RemoteApp {
    inbox: mpsc::UnboundedReceiver<Value>,
    window: Arc<WindowChannel>,
    frame: Arc<MemoryFrame>,
}

impl RemoteApp {
    /// The frame this remote lives in.
    pub fn frame(&self) -> &Arc<MemoryFrame> {
        &self.frame
    }

    /// Wait for the next envelope posted into the frame. Non-envelope posts
    /// are skipped. Returns `None` once the frame is removed.
    pub async fn recv(&mut self) -> Option<Envelope> {
        while let Some(raw) = self.inbox.recv().await {
            if let Some(envelope) = Envelope::from_value(&raw) {
                return Some(envelope);
            }
        }
        None
    }

    /// Non-blocking [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<Envelope> {
        while let Ok(raw) = self.inbox.try_recv() {
            if let Some(envelope) = Envelope::from_value(&raw) {
                return Some(envelope);
            }
        }
        None
    }

    /// Broadcast the unsolicited ready signal.
    pub fn signal_ready(&self) -> usize {
        self.emit(READY_EVENT, Value::Bool(true))
    }

    /// Acknowledge `request` with `body`, echoing its type and token.
    pub fn reply(&self, request: &Envelope, body: Value) -> usize {
        self.window.post(&request.reply(body).to_value())
    }

    /// Broadcast an unsolicited event.
    pub fn emit(&self, message_type: &str, body: Value) -> usize {
        self.window
            .post(&Envelope::unsolicited(message_type, body).to_value())
    }

    /// Broadcast a raw value, well-formed or not.
    pub fn post_raw(&self, message: &Value) -> usize {
        self.window.post(message)
    }

    /// Answer every incoming envelope with whatever `respond` returns,
    /// until the frame is removed. `None` leaves the request unanswered.
    pub async fn serve<F>(mut self, respond: F)
    where
        F: Fn(&Envelope) -> Option<Value>,
    {
        while let Some(request) = self.recv().await {
            if let Some(body) = respond(&request) {
                let _ = self.reply(&request, body);
            }
        }
    }
}
