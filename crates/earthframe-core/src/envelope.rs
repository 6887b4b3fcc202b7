//! The wire envelope carried over the window message channel.
//!
//! Both directions use the same three-field JSON object:
//!
//! ```json
//! { "type": "addLayer", "body": { ... }, "token": "k3x9a0zq" }
//! ```
//!
//! Older builds of the embedded application name the token field `extra`;
//! inbound parsing accepts either. Unsolicited events carry a `null` token.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::token::Token;

/// Field carrying the correlation token.
pub const TOKEN_FIELD: &str = "token";

/// Legacy name of [`TOKEN_FIELD`].
pub const LEGACY_TOKEN_FIELD: &str = "extra";

/// An owned message envelope.
///
/// Deserialization applies the same validation as [`InboundRef::parse`]:
/// when both `token` and `extra` are present, `token` wins.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Envelope {
    /// Message type name from the protocol vocabulary.
    #[serde(rename = "type")]
    pub message_type: String,
    /// Opaque payload whose shape is fixed by `message_type`.
    pub body: Value,
    /// Correlation token; `None` for unsolicited events.
    pub token: Option<Token>,
}

impl Envelope {
    /// Build an envelope for a correlated command.
    pub fn new(message_type: impl Into<String>, body: Value, token: Token) -> Self {
        Self {
            message_type: message_type.into(),
            body,
            token: Some(token),
        }
    }

    /// Build an envelope without a correlation token.
    pub fn unsolicited(message_type: impl Into<String>, body: Value) -> Self {
        Self {
            message_type: message_type.into(),
            body,
            token: None,
        }
    }

    /// Build the reply to this envelope: same type and token, new body.
    #[must_use]
    pub fn reply(&self, body: Value) -> Self {
        Self {
            message_type: self.message_type.clone(),
            body,
            token: self.token.clone(),
        }
    }

    /// Render as the JSON object posted on the channel.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "type": self.message_type,
            "body": self.body,
            "token": self.token,
        })
    }

    /// Parse a raw channel message. Returns `None` for anything that is not a
    /// well-formed envelope.
    pub fn from_value(raw: &Value) -> Option<Self> {
        let inbound = InboundRef::parse(raw)?;
        Some(Self {
            message_type: inbound.message_type.to_owned(),
            body: inbound.body.clone(),
            token: inbound.token.map(Token::from),
        })
    }
}

impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Self::from_value(&raw).ok_or_else(|| {
            de::Error::custom("expected an object with `type`, `body` and a string or null `token`")
        })
    }
}

/// A borrowed view of a validated inbound envelope.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InboundRef<'a> {
    /// Message type name.
    pub message_type: &'a str,
    /// Payload.
    pub body: &'a Value,
    /// Correlation token, if the sender supplied one.
    pub token: Option<&'a str>,
}

impl<'a> InboundRef<'a> {
    /// Validate the shape of a raw channel message.
    ///
    /// Requires an object with a string `type`, a `body` (any value, `null`
    /// included) and a `token`/`extra` field that is a string or `null`.
    pub fn parse(raw: &'a Value) -> Option<Self> {
        let obj = raw.as_object()?;
        let message_type = obj.get("type")?.as_str()?;
        let body = obj.get("body")?;
        let token = match obj.get(TOKEN_FIELD).or_else(|| obj.get(LEGACY_TOKEN_FIELD))? {
            Value::String(s) => Some(s.as_str()),
            Value::Null => None,
            _ => return None,
        };
        Some(Self {
            message_type,
            body,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_value_uses_wire_field_names() {
        let env = Envelope::new("removeLayer", json!({"id": "l1"}), Token::from("abcd1234"));
        assert_eq!(
            env.to_value(),
            json!({"type": "removeLayer", "body": {"id": "l1"}, "token": "abcd1234"})
        );
    }

    #[test]
    fn unsolicited_serialises_null_token() {
        let env = Envelope::unsolicited("initial", json!(true));
        assert_eq!(env.to_value()["token"], Value::Null);
    }

    #[test]
    fn reply_keeps_type_and_token() {
        let env = Envelope::new("addPoints", json!({"id": "p"}), Token::from("t0k3n000"));
        let reply = env.reply(json!(true));
        assert_eq!(reply.message_type, "addPoints");
        assert_eq!(reply.token, env.token);
        assert_eq!(reply.body, json!(true));
    }

    #[test]
    fn parse_accepts_legacy_extra_field() {
        let raw = json!({"type": "drawer", "body": {}, "extra": "zzzz0000"});
        let parsed = InboundRef::parse(&raw).unwrap();
        assert_eq!(parsed.token, Some("zzzz0000"));
    }

    #[test]
    fn parse_accepts_null_body_and_token() {
        let raw = json!({"type": "initial", "body": null, "token": null});
        let parsed = InboundRef::parse(&raw).unwrap();
        assert_eq!(parsed.message_type, "initial");
        assert!(parsed.body.is_null());
        assert!(parsed.token.is_none());
    }

    #[test]
    fn parse_rejects_primitives() {
        assert!(InboundRef::parse(&json!("initial")).is_none());
        assert!(InboundRef::parse(&json!(42)).is_none());
        assert!(InboundRef::parse(&json!(null)).is_none());
        assert!(InboundRef::parse(&json!(["initial", true, null])).is_none());
    }

    #[test]
    fn parse_rejects_missing_fields() {
        assert!(InboundRef::parse(&json!({"body": 1, "token": null})).is_none());
        assert!(InboundRef::parse(&json!({"type": "initial", "token": null})).is_none());
        assert!(InboundRef::parse(&json!({"type": "initial", "body": true})).is_none());
    }

    #[test]
    fn parse_rejects_non_string_type_or_token() {
        assert!(InboundRef::parse(&json!({"type": 7, "body": 1, "token": null})).is_none());
        assert!(InboundRef::parse(&json!({"type": "x", "body": 1, "token": 7})).is_none());
    }

    #[test]
    fn serde_reads_extra_alias() {
        let env: Envelope =
            serde_json::from_value(json!({"type": "cogQuery", "body": true, "extra": "aaaa1111"}))
                .unwrap();
        assert_eq!(env.token, Some(Token::from("aaaa1111")));
    }

    #[test]
    fn serde_prefers_token_over_extra() {
        let raw = json!({"type": "cogQuery", "body": true, "token": "tttt0000", "extra": "eeee1111"});
        let env: Envelope = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(env.token, Some(Token::from("tttt0000")));
        assert_eq!(Envelope::from_value(&raw), Some(env));
    }

    #[test]
    fn serde_rejects_what_the_router_drops() {
        assert!(serde_json::from_value::<Envelope>(json!({"type": "x", "body": 1})).is_err());
        assert!(serde_json::from_value::<Envelope>(json!({"type": "x", "body": 1, "token": 7})).is_err());
        assert!(serde_json::from_value::<Envelope>(json!("initial")).is_err());
    }

    #[test]
    fn from_value_roundtrips_to_value() {
        let env = Envelope::new("openTool", json!({"tool": "geocoder"}), Token::new());
        assert_eq!(Envelope::from_value(&env.to_value()), Some(env));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn serde_and_parse_agree_on_the_token(
                message_type in "[a-zA-Z:]{1,16}",
                token in proptest::option::of("[0-9a-z]{8}"),
                extra in proptest::option::of("[0-9a-z]{8}"),
            ) {
                let mut raw = json!({"type": message_type, "body": null});
                if let Some(t) = &token {
                    raw["token"] = json!(t);
                }
                if let Some(e) = &extra {
                    raw["extra"] = json!(e);
                }
                let parsed = InboundRef::parse(&raw).map(|r| r.token.map(str::to_owned));
                let decoded = serde_json::from_value::<Envelope>(raw.clone())
                    .ok()
                    .map(|env| env.token.map(Token::into_inner));
                prop_assert_eq!(&parsed, &decoded);
                match (&token, &extra) {
                    (None, None) => prop_assert!(parsed.is_none()),
                    (Some(t), _) | (None, Some(t)) => prop_assert_eq!(parsed, Some(Some(t.clone()))),
                }
            }
        }
    }
}
