//! Key-value capability used by the AutoScholar profile store.
//!
//! The profile engine only ever talks to a [`KeyValueStore`]: text values
//! under string keys, plus a change channel per key. Backends:
//! - [`MemoryStore`]: in-process map, optionally quota-limited
//! - `SqliteStore`: durable single-table store (feature `sqlite`)

pub mod event;
pub mod memory_store;
pub mod store;

#[cfg(feature = "sqlite")]
pub mod sqlite_store;

pub use event::*;
pub use memory_store::MemoryStore;
pub use store::*;

#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteStore;
