//! Transport collaborator contract for hashmirror.
//!
//! Defines the [`PubSubBus`] and [`BusSubscription`] traits a pub/sub
//! transport must satisfy — named channels carrying raw text payloads,
//! fire-and-forget publishing — and ships [`InMemoryBus`], a process-local
//! transport for tests and embedding.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{BusError, BusResult};
pub use memory::InMemoryBus;
pub use traits::{BusSubscription, PubSubBus};
