//! Store collaborator contract for hashmirror.
//!
//! Defines the [`HashStore`] trait a backing store must satisfy — a durable
//! service holding named hashes of string fields — and ships
//! [`InMemoryHashStore`], a process-local backend for tests and embedding.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryHashStore;
pub use traits::HashStore;
