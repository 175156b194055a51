//! Key-value persistence for the window state.
//!
//! The processor only ever needs `get`, `set` and `delete` on a single key,
//! so the backends stay small: an in-memory map for tests and ephemeral
//! runs, and a directory of files for state that outlives the process.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use winavg_core::Result;

/// String-keyed, string-valued store.
///
/// `set` must replace the value atomically: a concurrent or later `get`
/// observes either the old value or the new one, never a mix.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a key that does not exist is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}
