use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::instance::InstanceId;

/// Classification of a broadcast mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    /// A field was written (insert or overwrite).
    Add,
    /// A field was deleted.
    Remove,
    /// The entire hash was cleared.
    Reset,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Reset => "reset",
        };
        write!(f, "{s}")
    }
}

/// A mutation event as it travels on the replication channel.
///
/// Serialized as JSON text: `{"sender": ..., "type": "add", "key": ...,
/// "val": ...}`. `key` is omitted for `reset`; `val` is present only for
/// `add` and carries the envelope-encoded form of the value. Events are
/// ephemeral — never persisted, consumed at most once per subscriber.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BroadcastEvent {
    /// Identity of the mirror instance that produced the event.
    pub sender: InstanceId,
    /// What happened.
    #[serde(rename = "type")]
    pub kind: MutationKind,
    /// Field name; absent for `reset`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Envelope-encoded value; present only for `add`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<String>,
}

impl BroadcastEvent {
    /// Event for a field write, carrying the encoded value.
    pub fn add(sender: InstanceId, key: impl Into<String>, val: impl Into<String>) -> Self {
        Self {
            sender,
            kind: MutationKind::Add,
            key: Some(key.into()),
            val: Some(val.into()),
        }
    }

    /// Event for a field delete.
    pub fn remove(sender: InstanceId, key: impl Into<String>) -> Self {
        Self {
            sender,
            kind: MutationKind::Remove,
            key: Some(key.into()),
            val: None,
        }
    }

    /// Event for a full clear of the hash.
    pub fn reset(sender: InstanceId) -> Self {
        Self {
            sender,
            kind: MutationKind::Reset,
            key: None,
            val: None,
        }
    }

    /// Serialize to the wire form.
    pub fn to_json(&self) -> Result<String, CodecError> {
        serde_json::to_string(self).map_err(|e| CodecError::Serialization(e.to_string()))
    }

    /// Parse from the wire form.
    ///
    /// An unknown `type` string fails here, so unrecognized mutation kinds
    /// are rejected before they can reach a mirror's cache.
    pub fn from_json(raw: &str) -> Result<Self, CodecError> {
        serde_json::from_str(raw).map_err(|e| CodecError::MalformedEvent(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_event_wire_shape() {
        let sender = InstanceId::new();
        let event = BroadcastEvent::add(sender, "color", "blue");
        let json: serde_json::Value =
            serde_json::from_str(&event.to_json().unwrap()).unwrap();

        assert_eq!(json["type"], "add");
        assert_eq!(json["key"], "color");
        assert_eq!(json["val"], "blue");
        assert!(json["sender"].is_string());
    }

    #[test]
    fn remove_event_omits_val() {
        let event = BroadcastEvent::remove(InstanceId::new(), "color");
        let json: serde_json::Value =
            serde_json::from_str(&event.to_json().unwrap()).unwrap();

        assert_eq!(json["type"], "remove");
        assert_eq!(json["key"], "color");
        assert!(json.get("val").is_none());
    }

    #[test]
    fn reset_event_omits_key_and_val() {
        let event = BroadcastEvent::reset(InstanceId::new());
        let json: serde_json::Value =
            serde_json::from_str(&event.to_json().unwrap()).unwrap();

        assert_eq!(json["type"], "reset");
        assert!(json.get("key").is_none());
        assert!(json.get("val").is_none());
    }

    #[test]
    fn wire_roundtrip() {
        let event = BroadcastEvent::add(InstanceId::new(), "k", "[_obj_]{\"a\":1}");
        let parsed = BroadcastEvent::from_json(&event.to_json().unwrap()).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn unknown_type_fails_to_parse() {
        let raw = format!(
            r#"{{"sender":"{}","type":"upsert","key":"k"}}"#,
            InstanceId::new()
        );
        assert!(matches!(
            BroadcastEvent::from_json(&raw),
            Err(CodecError::MalformedEvent(_))
        ));
    }

    #[test]
    fn garbage_fails_to_parse() {
        assert!(BroadcastEvent::from_json("not json at all").is_err());
    }

    #[test]
    fn mutation_kind_display() {
        assert_eq!(format!("{}", MutationKind::Add), "add");
        assert_eq!(format!("{}", MutationKind::Reset), "reset");
    }
}
