use thiserror::Error;

/// Errors produced by the pub/sub transport.
#[derive(Debug, Error)]
pub enum BusError {
    /// The subscription's channel is closed; no further messages will arrive.
    #[error("subscription channel closed")]
    ChannelClosed,

    /// The subscriber fell behind and the given number of messages were
    /// dropped before it could read them.
    #[error("subscriber lagged, {0} messages dropped")]
    Lagged(u64),

    /// The backend reported a failure (connection lost, command rejected).
    #[error("bus backend error: {0}")]
    Backend(String),
}

pub type BusResult<T> = Result<T, BusError>;
