//! Protocol catalog errors.

use thiserror::Error;

/// Errors raised while mapping wire values onto catalog types.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The envelope names an event outside the catalog.
    #[error("unknown event type: {0}")]
    UnknownEvent(String),
    /// A known event carried a body of the wrong shape.
    #[error("malformed {event} payload: {source}")]
    Payload {
        /// Event type name.
        event: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// A scalar setting was outside its accepted values.
    #[error("invalid {field}: {value}")]
    InvalidValue {
        /// Wire name of the field.
        field: &'static str,
        /// Rejected input.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_event_display() {
        let err = ProtocolError::UnknownEvent("layer:explode".into());
        assert_eq!(err.to_string(), "unknown event type: layer:explode");
    }

    #[test]
    fn invalid_value_display() {
        let err = ProtocolError::InvalidValue {
            field: "displayMode",
            value: "7".into(),
        };
        assert_eq!(err.to_string(), "invalid displayMode: 7");
    }

    #[test]
    fn payload_display_names_event() {
        let source = serde_json::from_str::<bool>("{}").unwrap_err();
        let err = ProtocolError::Payload {
            event: "initial".into(),
            source,
        };
        assert!(err.to_string().starts_with("malformed initial payload"));
    }
}
