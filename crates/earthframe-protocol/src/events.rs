//! Unsolicited events emitted by the map.

use earthframe_core::{Envelope, Event};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::MapConfig;
use crate::errors::ProtocolError;
use crate::layer::{DataSet, LayerManageItem};

macro_rules! event_catalog {
    ($($(#[$doc:meta])* $marker:ident => $name:literal : $payload:ty),* $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Clone, Copy, Debug)]
            pub struct $marker;

            impl Event for $marker {
                const TYPE: &'static str = $name;
                type Payload = $payload;
            }
        )*

        /// Every unsolicited event, tagged by wire name.
        #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type", content = "body")]
        pub enum InboundEvent {
            $(
                $(#[$doc])*
                #[serde(rename = $name)]
                $marker($payload),
            )*
        }

        impl InboundEvent {
            /// Every event wire name.
            pub const NAMES: &'static [&'static str] = &[$($name),*];

            /// Wire name of this event.
            pub fn message_type(&self) -> &'static str {
                match self {
                    $(Self::$marker(_) => $name,)*
                }
            }

            fn decode(message_type: &str, body: &Value) -> Result<Self, ProtocolError> {
                let payload_error = |source: serde_json::Error| ProtocolError::Payload {
                    event: message_type.to_owned(),
                    source,
                };
                match message_type {
                    $($name => <$payload>::deserialize(body).map(Self::$marker).map_err(payload_error),)*
                    other => Err(ProtocolError::UnknownEvent(other.to_owned())),
                }
            }
        }
    };
}

event_catalog! {
    /// The map finished loading.
    Initial => "initial": bool,
    /// A layer was added.
    LayerAdd => "layer:add": LayerManageItem,
    /// A layer was re-rendered.
    LayerRender => "layer:render": LayerManageItem,
    /// A layer's settings changed.
    LayerUpdate => "layer:update": LayerManageItem,
    /// A layer was removed.
    LayerRemove => "layer:remove": LayerManageItem,
    /// The draw order changed. Carries the full new order.
    LayerMove => "layer:move": Vec<LayerManageItem>,
    /// A data set was added.
    DataSetAdd => "dataSet:add": DataSet,
    /// A data set changed.
    DataSetUpdate => "dataSet:update": DataSet,
    /// A data set was removed.
    DataSetRemove => "dataSet:remove": DataSet,
    /// The user changed map settings.
    MapConfigUpdate => "mapConfig:update": MapConfig,
}

impl InboundEvent {
    /// Decode an unsolicited envelope.
    ///
    /// Replies to commands share their command's name and are not events;
    /// they fail with [`ProtocolError::UnknownEvent`].
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, ProtocolError> {
        Self::decode(&envelope.message_type, &envelope.body)
    }

    /// Whether `message_type` names a catalogued event.
    pub fn is_event(message_type: &str) -> bool {
        Self::NAMES.contains(&message_type)
    }
}
