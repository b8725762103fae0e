//! Foundation types for hashmirror.
//!
//! This crate provides the types shared by every other hashmirror crate:
//! the process-instance identity used for self-origin filtering, the value
//! envelope codec that lets structured values travel through a text-only
//! store, and the broadcast event wire format.
//!
//! # Key Types
//!
//! - [`InstanceId`] — UUID v7 identity minted per mirror instance
//! - [`Value`] — scalar or structured value, with the envelope codec
//! - [`BroadcastEvent`] — mutation event as it appears on the wire
//! - [`MutationKind`] — `add` / `remove` / `reset` classification

pub mod error;
pub mod event;
pub mod instance;
pub mod value;

pub use error::CodecError;
pub use event::{BroadcastEvent, MutationKind};
pub use instance::InstanceId;
pub use value::{Value, LIT_MARKER, OBJ_MARKER};
