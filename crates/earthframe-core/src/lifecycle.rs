//! Embedded frame lifecycle: construction, handshake, readiness, teardown.
//!
//! ```text
//! Loading ──initial + mapConfig ack──▶ Ready
//!    │                                  │
//!    └────────────destroy()─────────────┴──▶ Destroyed
//! ```
//!
//! The embedded application announces itself with an unsolicited
//! [`READY_EVENT`]. On the first one, the frame pushes its initial
//! configuration as a [`CONFIG_COMMAND`]; the acknowledgment moves the
//! connection to [`ConnectionState::Ready`] and releases
//! [`EarthFrame::wait_ready`]. Until then [`EarthFrame::send`] is a no-op.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::bridge::Bridge;
use crate::errors::{BridgeError, Result};
use crate::host::{Container, Frame, FrameSpec, Host, MessageListener, SubscriptionId};
use crate::message::{Command, Event};
use crate::registry::{ListenOptions, ListenerRegistry};
use crate::router::Router;
use crate::token::ListenerId;

/// Unsolicited event the embedded application emits once it has loaded.
pub const READY_EVENT: &str = "initial";

/// Command carrying the initial configuration during the handshake.
pub const CONFIG_COMMAND: &str = "mapConfig";

/// Default address of the embedded application.
pub const DEFAULT_BASE_URL: &str = "https://deep-time.org/map/#/showcase";

/// Connection state of an [`EarthFrame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// Frame mounted, handshake not yet complete.
    Loading,
    /// Handshake acknowledged; commands may be sent.
    Ready,
    /// Torn down. Terminal.
    Destroyed,
}

/// Construction options.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameOptions {
    /// Address of the embedded application.
    pub base_url: String,
    /// Body of the [`CONFIG_COMMAND`] sent during the handshake.
    pub initial_config: Value,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            initial_config: Value::Object(serde_json::Map::new()),
        }
    }
}

impl FrameOptions {
    /// Defaults: [`DEFAULT_BASE_URL`] and an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the application from `base_url`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send `config` during the handshake.
    #[must_use]
    pub fn with_initial_config(mut self, config: Value) -> Self {
        self.initial_config = config;
        self
    }
}

struct Inner {
    host: Arc<dyn Host>,
    frame: Arc<dyn Frame>,
    registry: Arc<ListenerRegistry>,
    router: Router,
    bridge: Bridge,
    state: watch::Sender<ConnectionState>,
    subscription: Mutex<Option<SubscriptionId>>,
    base_url: String,
    initial_config: Value,
}

impl Inner {
    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn on_window_message(&self, raw: &Value) {
        if self.state() == ConnectionState::Destroyed {
            return;
        }
        let _ = self.router.route(raw);
    }

    fn begin_handshake(self: &Arc<Self>) {
        if self.state() != ConnectionState::Loading {
            return;
        }
        debug!(base_url = %self.base_url, "embedded application ready, sending configuration");
        let weak = Arc::downgrade(self);
        let sent = self.bridge.correlate(
            CONFIG_COMMAND,
            self.initial_config.clone(),
            move |_ack: &Value| {
                if let Some(inner) = weak.upgrade() {
                    inner.mark_ready();
                }
            },
        );
        if let Err(e) = sent {
            warn!(error = %e, "failed to send initial configuration");
        }
    }

    fn mark_ready(&self) {
        let changed = self.state.send_if_modified(|state| {
            if *state == ConnectionState::Loading {
                *state = ConnectionState::Ready;
                true
            } else {
                false
            }
        });
        if changed {
            info!(base_url = %self.base_url, "embedded frame ready");
        }
    }
}

/// A framed map application and the bridge to it.
///
/// Cloning yields another handle to the same frame.
#[derive(Clone)]
pub struct EarthFrame {
    inner: Arc<Inner>,
}

impl EarthFrame {
    /// Mount the application in `container` and start listening.
    ///
    /// Fails with [`BridgeError::ContainerNotFound`] when the host cannot
    /// resolve the container; nothing is mounted in that case.
    pub fn new(
        host: Arc<dyn Host>,
        container: impl Into<Container>,
        options: FrameOptions,
    ) -> Result<Self> {
        let container = container.into();
        let element =
            host.resolve_container(&container)
                .ok_or_else(|| BridgeError::ContainerNotFound {
                    container: container.to_string(),
                })?;

        let frame = host.mount_frame(&element, &FrameSpec::filling(&options.base_url));
        let registry = Arc::new(ListenerRegistry::new());
        let (state, _) = watch::channel(ConnectionState::Loading);
        let inner = Arc::new(Inner {
            host: Arc::clone(&host),
            frame: Arc::clone(&frame),
            router: Router::new(Arc::clone(&registry)),
            bridge: Bridge::new(Arc::clone(&registry), frame),
            registry,
            state,
            subscription: Mutex::new(None),
            base_url: options.base_url,
            initial_config: options.initial_config,
        });

        let listener: MessageListener = {
            let weak: Weak<Inner> = Arc::downgrade(&inner);
            Arc::new(move |raw: &Value| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_window_message(raw);
                }
            })
        };
        *inner.subscription.lock() = Some(host.subscribe(listener));

        let weak = Arc::downgrade(&inner);
        let _ = inner.registry.register(
            READY_EVENT,
            move |_: &Value| {
                if let Some(inner) = weak.upgrade() {
                    inner.begin_handshake();
                }
            },
            ListenOptions::new().once(),
        )?;

        debug!(%container, base_url = %inner.base_url, "mounted embedded frame");
        Ok(Self { inner })
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    /// Whether the handshake has completed and the frame is not destroyed.
    pub fn is_ready(&self) -> bool {
        self.state() == ConnectionState::Ready
    }

    /// Whether [`destroy`](Self::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.state() == ConnectionState::Destroyed
    }

    /// Address the application was loaded from.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The listener registry backing this frame.
    pub fn registry(&self) -> &ListenerRegistry {
        &self.inner.registry
    }

    /// Wait for the handshake to complete.
    ///
    /// Never resolves if the application never signals readiness. Fails with
    /// [`BridgeError::Destroyed`] if the frame is torn down first.
    pub async fn wait_ready(&self) -> Result<()> {
        let mut rx = self.inner.state.subscribe();
        let state = *rx
            .wait_for(|state| *state != ConnectionState::Loading)
            .await
            .map_err(|_| BridgeError::Destroyed)?;
        match state {
            ConnectionState::Ready => Ok(()),
            _ => Err(BridgeError::Destroyed),
        }
    }

    /// Listen for `message_type` envelopes.
    pub fn on<F>(
        &self,
        message_type: impl Into<String>,
        handler: F,
        options: ListenOptions,
    ) -> Result<ListenerId>
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.inner.registry.register(message_type, handler, options)
    }

    /// Listen for a typed event. Payloads that do not decode are logged and
    /// skipped.
    pub fn on_event<E, F>(&self, handler: F, options: ListenOptions) -> Result<ListenerId>
    where
        E: Event + 'static,
        F: Fn(E::Payload) + Send + Sync + 'static,
    {
        self.on(
            E::TYPE,
            move |body: &Value| match serde_json::from_value::<E::Payload>(body.clone()) {
                Ok(payload) => handler(payload),
                Err(e) => warn!(event = E::TYPE, error = %e, "dropping event with unexpected payload"),
            },
            options,
        )
    }

    /// Remove a listener from every type it is registered under. A no-op
    /// after teardown.
    pub fn remove(&self, id: &str) -> bool {
        self.inner.registry.remove(id)
    }

    /// Send a command and wait for its reply.
    ///
    /// Resolves to `Ok(None)` without touching the transport when the frame
    /// is not ready or its document is unavailable, including a teardown
    /// that lands after the readiness check. Never times out; a teardown
    /// while the reply is outstanding fails with [`BridgeError::Destroyed`].
    pub async fn send(&self, message_type: &str, body: Value) -> Result<Option<Value>> {
        if !self.is_ready() || !self.inner.bridge.is_attached() {
            debug!(message_type, state = ?self.state(), "frame not ready, dropping send");
            return Ok(None);
        }
        let pending = match self.inner.bridge.request(message_type, body) {
            Ok(pending) => pending,
            Err(BridgeError::Destroyed) => {
                debug!(message_type, "frame torn down before send, dropping");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        Ok(Some(pending.await?))
    }

    /// Typed [`send`](Self::send).
    pub async fn dispatch<C: Command>(&self, command: &C) -> Result<Option<C::Response>> {
        let body = serde_json::to_value(command).map_err(|source| BridgeError::Encode {
            message_type: C::TYPE.to_owned(),
            source,
        })?;
        let Some(reply) = self.send(C::TYPE, body).await? else {
            return Ok(None);
        };
        serde_json::from_value(reply)
            .map(Some)
            .map_err(|source| BridgeError::Decode {
                message_type: C::TYPE.to_owned(),
                source,
            })
    }

    /// Tear down: remove the frame, stop listening, drop every listener.
    /// Idempotent.
    pub fn destroy(&self) {
        let previous = self.inner.state.send_replace(ConnectionState::Destroyed);
        if previous == ConnectionState::Destroyed {
            return;
        }
        self.inner.frame.remove();
        if let Some(id) = self.inner.subscription.lock().take() {
            self.inner.host.unsubscribe(id);
        }
        self.inner.registry.clear();
        info!(base_url = %self.inner.base_url, ?previous, "embedded frame destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryHost;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn mount(host: &Arc<MemoryHost>) -> EarthFrame {
        EarthFrame::new(host.clone(), "map", FrameOptions::new()).unwrap()
    }

    #[test]
    fn unknown_container_fails_construction() {
        let host = Arc::new(MemoryHost::new());
        let err = EarthFrame::new(host.clone(), "missing", FrameOptions::new())
            .err()
            .unwrap();
        assert_matches!(err, BridgeError::ContainerNotFound { ref container } if container == "#missing");
        assert!(host.frames().is_empty());
        assert_eq!(host.subscriber_count(), 0);
    }

    #[test]
    fn construction_mounts_filling_frame_and_subscribes() {
        let host = Arc::new(MemoryHost::with_containers(["map"]));
        let frame = EarthFrame::new(
            host.clone(),
            "map",
            FrameOptions::new().with_base_url("https://maps.example/#/embed"),
        )
        .unwrap();

        let frames = host.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].spec(), &FrameSpec::filling("https://maps.example/#/embed"));
        assert_eq!(host.subscriber_count(), 1);
        assert_eq!(frame.state(), ConnectionState::Loading);
        assert_eq!(frame.base_url(), "https://maps.example/#/embed");
    }

    #[test]
    fn default_options_point_at_showcase() {
        let options = FrameOptions::default();
        assert_eq!(options.base_url, DEFAULT_BASE_URL);
        assert_eq!(options.initial_config, json!({}));
    }

    #[tokio::test]
    async fn send_before_ready_is_a_silent_noop() {
        let host = Arc::new(MemoryHost::with_containers(["map"]));
        let frame = mount(&host);
        let mut remote = host.take_remote().unwrap();

        let reply = frame.send("removeLayer", json!({"id": "x"})).await.unwrap();
        assert!(reply.is_none());
        assert!(remote.try_recv().is_none());
        assert_eq!(remote.frame().posted_count(), 0);
    }

    #[tokio::test]
    async fn ready_signal_sends_config_and_waits_for_ack() {
        let host = Arc::new(MemoryHost::with_containers(["map"]));
        let frame = EarthFrame::new(
            host.clone(),
            "map",
            FrameOptions::new().with_initial_config(json!({"language": "en-US"})),
        )
        .unwrap();
        let mut remote = host.take_remote().unwrap();

        let _ = remote.signal_ready();
        let config = remote.try_recv().unwrap();
        assert_eq!(config.message_type, CONFIG_COMMAND);
        assert_eq!(config.body, json!({"language": "en-US"}));
        assert_eq!(frame.state(), ConnectionState::Loading);

        let mut ready = Box::pin(frame.wait_ready());
        assert!(futures::poll!(&mut ready).is_pending());

        let _ = remote.reply(&config, json!(true));
        ready.await.unwrap();
        assert!(frame.is_ready());
    }

    #[tokio::test]
    async fn teardown_after_readiness_check_is_a_silent_noop() {
        let host = Arc::new(MemoryHost::with_containers(["map"]));
        let frame = mount(&host);
        let mut remote = host.take_remote().unwrap();
        let _ = remote.signal_ready();
        let config = remote.try_recv().unwrap();
        let _ = remote.reply(&config, json!(true));
        frame.wait_ready().await.unwrap();

        // Registry closed while the state still reads Ready, as when a
        // concurrent destroy has not yet published its transition.
        frame.inner.registry.clear();
        assert!(frame.is_ready());

        let reply = frame.send("removeLayer", json!({"id": "x"})).await.unwrap();
        assert!(reply.is_none());
        assert!(remote.try_recv().is_none());
    }

    #[tokio::test]
    async fn second_ready_signal_is_ignored() {
        let host = Arc::new(MemoryHost::with_containers(["map"]));
        let _frame = mount(&host);
        let mut remote = host.take_remote().unwrap();

        let _ = remote.signal_ready();
        let _ = remote.signal_ready();
        assert!(remote.try_recv().is_some());
        assert!(remote.try_recv().is_none());
    }

    #[tokio::test]
    async fn ack_with_wrong_token_does_not_complete_handshake() {
        let host = Arc::new(MemoryHost::with_containers(["map"]));
        let frame = mount(&host);
        let mut remote = host.take_remote().unwrap();

        let _ = remote.signal_ready();
        let _config = remote.try_recv().unwrap();
        let _ = remote.post_raw(&json!({"type": CONFIG_COMMAND, "body": true, "token": "bogus000"}));
        assert_eq!(frame.state(), ConnectionState::Loading);
    }

    #[tokio::test]
    async fn destroy_releases_wait_ready() {
        let host = Arc::new(MemoryHost::with_containers(["map"]));
        let frame = mount(&host);
        let waiter = frame.clone();
        let handle = tokio::spawn(async move { waiter.wait_ready().await });
        tokio::task::yield_now().await;

        frame.destroy();
        assert_matches!(handle.await.unwrap(), Err(BridgeError::Destroyed));
    }

    #[test]
    fn destroy_tears_everything_down() {
        let host = Arc::new(MemoryHost::with_containers(["map"]));
        let frame = mount(&host);
        let _ = frame
            .on("layer:add", |_| {}, ListenOptions::new().with_id("keep"))
            .unwrap();

        frame.destroy();
        assert!(frame.is_destroyed());
        assert!(!host.frames()[0].is_attached());
        assert_eq!(host.subscriber_count(), 0);
        assert!(frame.registry().is_empty());
        assert!(!frame.remove("keep"));
        assert_matches!(
            frame.on("layer:add", |_| {}, ListenOptions::new()),
            Err(BridgeError::Destroyed)
        );

        frame.destroy();
        assert!(frame.is_destroyed());
    }

    #[test]
    fn destroy_from_loading_is_terminal() {
        let host = Arc::new(MemoryHost::with_containers(["map"]));
        let frame = mount(&host);
        let remote = host.take_remote().unwrap();
        frame.destroy();
        let _ = remote.signal_ready();
        assert_eq!(frame.state(), ConnectionState::Destroyed);
    }
}
