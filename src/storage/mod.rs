//! Storage
//!
//! Durable key/value storage for the cart, and the repository that maps a
//! [`CartSnapshot`](crate::cart::CartSnapshot) onto it.

use thiserror::Error;

pub mod file;
pub mod memory;
pub mod repository;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use repository::{CartRepository, RepositoryError, StorageKeys, StoreRepository};

/// Errors raised by a key/value store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying file system error.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Writing the value would exceed the store's byte quota.
    #[error("writing {key} would exceed the storage quota of {quota} bytes")]
    QuotaExceeded {
        /// Key being written
        key: String,
        /// Configured quota in bytes
        quota: usize,
    },
}

/// A string key/value store, shaped after browser local storage.
pub trait KeyValueStore {
    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the value cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing medium cannot be modified.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}
