//! Process-local mirror of a remote named hash.
//!
//! A [`Mirror`] gives each process an in-memory read-through cache of a hash
//! held in a shared store, and keeps mirrors in different processes
//! synchronized by broadcasting mutations over a publish/subscribe channel.
//! Writes go to the store first and are only reflected locally (and
//! broadcast) after confirmed durability; a mirror never reacts to its own
//! broadcasts.
//!
//! Consistency is eventual and last-observed-wins: there is no cross-key
//! atomicity and no conflict resolution for concurrent writes to the same
//! field.
//!
//! The store and transport are collaborators behind the
//! [`HashStore`](hashmirror_store::HashStore) and
//! [`PubSubBus`](hashmirror_bus::PubSubBus) traits; in-memory
//! implementations of both ship in their crates for tests and embedding.

mod channel;

pub mod config;
pub mod error;
pub mod mirror;
pub mod observe;

pub use config::MirrorConfig;
pub use error::{MirrorError, MirrorResult};
pub use mirror::Mirror;
pub use observe::{ChangeFilter, ChangeStream, MirrorChange};

pub use hashmirror_types::{BroadcastEvent, CodecError, InstanceId, MutationKind, Value};
