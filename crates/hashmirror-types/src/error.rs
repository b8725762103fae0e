use thiserror::Error;

/// Errors produced by the envelope and event codecs.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A payload carried the structured-value marker but its body failed
    /// to parse.
    #[error("malformed structured payload: {0}")]
    MalformedPayload(String),

    /// A raw broadcast message could not be parsed into an event.
    #[error("malformed broadcast event: {0}")]
    MalformedEvent(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
