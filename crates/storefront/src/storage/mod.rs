//! Local key-value persistence.
//!
//! The storefront keeps a small amount of state on the shopper's side: the
//! anonymous user ID and a copy of the cart used when the backend is down.
//! [`KeyValueStore`] is the seam; [`MemoryStore`] backs tests and throwaway
//! sessions, [`FileStore`] keeps a JSON file on disk for the CLI.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Storage keys.
pub mod keys {
    /// Key for the anonymous shopper ID.
    pub const USER_ID: &str = "userId";

    /// Key for the serialized cart state.
    pub const CART: &str = "cart";
}

/// Errors from a key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a JSON object of strings.
    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A previous writer panicked while holding the lock.
    #[error("storage lock poisoned")]
    LockPoisoned,
}

/// String key-value storage with local-storage semantics.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
