//! The page environment an [`EarthFrame`](crate::EarthFrame) lives in.
//!
//! A [`Host`] finds container elements, mounts framed documents, and owns the
//! window-level message channel. A [`Frame`] is the send side of one mounted
//! document. Browser bindings implement these over the DOM; [`memory`]
//! provides an in-process page for tests and demos.

pub mod memory;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::TransportError;

/// Callback receiving every message posted on the window channel.
pub type MessageListener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Opaque handle to a container element.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    /// Wrap a host-specific element reference.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The host-specific reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where to mount the frame: an element already in hand, or an element id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Container {
    /// Look up the element by id.
    Id(String),
    /// Use this element directly.
    Element(ElementHandle),
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Element(el) => write!(f, "{el}"),
        }
    }
}

impl From<&str> for Container {
    fn from(id: &str) -> Self {
        Self::Id(id.to_owned())
    }
}

impl From<String> for Container {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<ElementHandle> for Container {
    fn from(el: ElementHandle) -> Self {
        Self::Element(el)
    }
}

/// How the framed document is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSpec {
    /// Document URL.
    pub src: String,
    /// CSS width.
    pub width: String,
    /// CSS height.
    pub height: String,
}

impl FrameSpec {
    /// A frame loading `src` that fills its container.
    pub fn filling(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            width: "100%".into(),
            height: "100%".into(),
        }
    }
}

/// Identifies a window-channel subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// The page environment.
pub trait Host: Send + Sync {
    /// Resolve a container to an element, or `None` if it does not exist.
    fn resolve_container(&self, container: &Container) -> Option<ElementHandle>;

    /// Create a framed document inside `container`.
    fn mount_frame(&self, container: &ElementHandle, spec: &FrameSpec) -> Arc<dyn Frame>;

    /// Start receiving every message posted on the window channel.
    fn subscribe(&self, listener: MessageListener) -> SubscriptionId;

    /// Stop a subscription. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// The send side of a mounted document.
pub trait Frame: Send + Sync {
    /// Post a message to the framed document.
    fn post_message(&self, message: Value) -> Result<(), TransportError>;

    /// Whether the document can currently receive messages.
    fn is_attached(&self) -> bool;

    /// Remove the frame from the page.
    fn remove(&self);
}
