use std::fmt;

use crate::error::CodecError;

/// Marker prefix tagging a serialized structured value.
pub const OBJ_MARKER: &str = "[_obj_]";

/// Escape prefix for scalars whose content happens to begin with a marker.
///
/// Without it, a scalar payload starting with [`OBJ_MARKER`] would be
/// indistinguishable from an encoded structured value on decode.
pub const LIT_MARKER: &str = "[_lit_]";

/// A value held by a mirror: either a scalar string or an arbitrary
/// structured (JSON) value.
///
/// Scalars travel through the store and the replication channel verbatim.
/// Structured values are serialized to JSON and tagged with [`OBJ_MARKER`]
/// so the receiving side knows to parse rather than use them as-is.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Plain string content, stored and transmitted as-is.
    Scalar(String),
    /// Arbitrary structured content, serialized behind the object marker.
    Structured(serde_json::Value),
}

impl Value {
    /// Encode for the store or the wire.
    ///
    /// Structured values become `OBJ_MARKER + json`. A scalar that starts
    /// with either marker is escaped with [`LIT_MARKER`]; every other scalar
    /// passes through unchanged. The result is always plain text.
    pub fn encode(&self) -> Result<String, CodecError> {
        match self {
            Value::Structured(json) => {
                let body = serde_json::to_string(json)
                    .map_err(|e| CodecError::Serialization(e.to_string()))?;
                Ok(format!("{OBJ_MARKER}{body}"))
            }
            Value::Scalar(s) => {
                if s.starts_with(OBJ_MARKER) || s.starts_with(LIT_MARKER) {
                    Ok(format!("{LIT_MARKER}{s}"))
                } else {
                    Ok(s.clone())
                }
            }
        }
    }

    /// Decode a raw payload read from the store or received on the wire.
    ///
    /// Strips exactly one marker: `OBJ_MARKER` means "parse the rest as
    /// JSON", `LIT_MARKER` means "the rest is a literal scalar", and no
    /// marker means the whole payload is a scalar.
    pub fn decode(raw: &str) -> Result<Self, CodecError> {
        if let Some(body) = raw.strip_prefix(OBJ_MARKER) {
            let json = serde_json::from_str(body)
                .map_err(|e| CodecError::MalformedPayload(e.to_string()))?;
            return Ok(Value::Structured(json));
        }
        if let Some(body) = raw.strip_prefix(LIT_MARKER) {
            return Ok(Value::Scalar(body.to_string()));
        }
        Ok(Value::Scalar(raw.to_string()))
    }

    /// Returns `true` for structured values.
    pub fn is_structured(&self) -> bool {
        matches!(self, Value::Structured(_))
    }

    /// Scalar content, if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::Structured(_) => None,
        }
    }

    /// Structured content, if this is a structured value.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Scalar(_) => None,
            Value::Structured(json) => Some(json),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::Structured(json)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => write!(f, "{s}"),
            Value::Structured(json) => write!(f, "{json}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -----------------------------------------------------------------------
    // Scalars
    // -----------------------------------------------------------------------

    #[test]
    fn plain_scalar_passes_through() {
        let v = Value::from("hello");
        assert_eq!(v.encode().unwrap(), "hello");
        assert_eq!(Value::decode("hello").unwrap(), v);
    }

    #[test]
    fn numeric_string_stays_scalar() {
        let v = Value::from("42");
        assert_eq!(v.encode().unwrap(), "42");
        assert_eq!(Value::decode("42").unwrap(), Value::Scalar("42".into()));
    }

    #[test]
    fn empty_scalar_roundtrip() {
        let v = Value::from("");
        let encoded = v.encode().unwrap();
        assert_eq!(Value::decode(&encoded).unwrap(), v);
    }

    // -----------------------------------------------------------------------
    // Structured values
    // -----------------------------------------------------------------------

    #[test]
    fn structured_value_is_tagged() {
        let v = Value::from(json!({"a": 1, "b": [2, 3]}));
        let encoded = v.encode().unwrap();
        assert!(encoded.starts_with(OBJ_MARKER));
        assert_eq!(Value::decode(&encoded).unwrap(), v);
    }

    #[test]
    fn structured_roundtrip_deep_equality() {
        let v = Value::from(json!({
            "name": "widget",
            "tags": ["a", "b"],
            "nested": {"count": 7, "ok": true, "none": null}
        }));
        let decoded = Value::decode(&v.encode().unwrap()).unwrap();
        assert_eq!(decoded, v);
        assert!(decoded.is_structured());
    }

    #[test]
    fn malformed_structured_payload_is_an_error() {
        let raw = format!("{OBJ_MARKER}{{not json");
        assert!(matches!(
            Value::decode(&raw),
            Err(CodecError::MalformedPayload(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Marker collision escaping
    // -----------------------------------------------------------------------

    #[test]
    fn scalar_starting_with_obj_marker_is_escaped() {
        let pathological = format!("{OBJ_MARKER}not really an object");
        let v = Value::Scalar(pathological.clone());
        let encoded = v.encode().unwrap();
        assert!(encoded.starts_with(LIT_MARKER));
        assert_eq!(Value::decode(&encoded).unwrap(), v);
    }

    #[test]
    fn scalar_starting_with_lit_marker_is_escaped() {
        let pathological = format!("{LIT_MARKER}[_obj_]twice over");
        let v = Value::Scalar(pathological.clone());
        let encoded = v.encode().unwrap();
        let decoded = Value::decode(&encoded).unwrap();
        assert_eq!(decoded, v);
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[test]
    fn accessors_match_variant() {
        let s = Value::from("text");
        assert_eq!(s.as_str(), Some("text"));
        assert!(s.as_json().is_none());

        let j = Value::from(json!([1, 2]));
        assert!(j.as_str().is_none());
        assert_eq!(j.as_json(), Some(&json!([1, 2])));
    }

    // -----------------------------------------------------------------------
    // Envelope property
    // -----------------------------------------------------------------------

    proptest::proptest! {
        #[test]
        fn any_scalar_survives_the_envelope(s in ".*") {
            let v = Value::Scalar(s);
            let encoded = v.encode().unwrap();
            proptest::prop_assert_eq!(Value::decode(&encoded).unwrap(), v);
        }
    }
}
