//! Persistence layer — async key-value store backends.

pub mod keys;
pub mod libsql_backend;
pub mod memory;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlStore;
pub use memory::MemoryStore;
pub use traits::{KeyValueStore, PersistOutcome};
