use thiserror::Error;

use hashmirror_bus::BusError;
use hashmirror_store::StoreError;
use hashmirror_types::CodecError;

/// Errors surfaced by mirror operations.
///
/// Store failures always reach the caller of the operation that triggered
/// them. Transport failures reach the caller only when they occur during
/// subscription at init; publish failures after a durable write are logged
/// instead, since the store write is the authoritative outcome.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("transport error: {0}")]
    Bus(#[from] BusError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

pub type MirrorResult<T> = Result<T, MirrorError>;
