//! Cart Repository

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::warn;

use crate::cart::CartSnapshot;

use super::{KeyValueStore, StorageError};

/// Errors raised while loading or saving cart state.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backing store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A stored value was not valid JSON of the expected shape.
    #[error("stored value under {key} is malformed: {source}")]
    Malformed {
        /// Key holding the bad value
        key: String,
        /// Parse error
        source: serde_json::Error,
    },

    /// State could not be encoded.
    #[error("failed to encode {key}: {source}")]
    Encode {
        /// Key being written
        key: String,
        /// Encode error
        source: serde_json::Error,
    },
}

/// Load/save interface for cart state.
#[cfg_attr(test, mockall::automock)]
pub trait CartRepository {
    /// Reads the persisted cart, returning an empty snapshot when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns a [`RepositoryError`] if the stored state cannot be read or parsed.
    fn load(&self) -> Result<CartSnapshot, RepositoryError>;

    /// Replaces the persisted cart with `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns a [`RepositoryError`] if the state cannot be encoded or written.
    fn save(&mut self, snapshot: &CartSnapshot) -> Result<(), RepositoryError>;
}

/// Storage keys used for the two halves of the cart state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKeys {
    /// Key for the serialized line items
    pub items: String,

    /// Key for the serialized active flash discounts
    pub flash_discounts: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            items: "cart".to_string(),
            flash_discounts: "activeFlashDiscounts".to_string(),
        }
    }
}

/// Repository persisting cart state as two JSON values in a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct StoreRepository<S> {
    store: S,
    keys: StorageKeys,
}

impl<S: KeyValueStore> StoreRepository<S> {
    /// Create a repository using the default storage keys.
    pub fn new(store: S) -> Self {
        Self::with_keys(store, StorageKeys::default())
    }

    /// Create a repository using custom storage keys.
    pub fn with_keys(store: S, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The underlying store, mutably.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The storage keys in use.
    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, RepositoryError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(Vec::new());
        };

        let entries: Vec<serde_json::Value> =
            serde_json::from_str(&raw).map_err(|source| RepositoryError::Malformed {
                key: key.to_string(),
                source,
            })?;

        // Entries that fail to decode are dropped one at a time.
        Ok(entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                serde_json::from_value::<T>(entry)
                    .inspect_err(|error| {
                        warn!(key, index, %error, "skipping undecodable stored entry");
                    })
                    .ok()
            })
            .collect())
    }

    fn write_list<T: Serialize>(&mut self, key: &str, list: &[T]) -> Result<(), RepositoryError> {
        let raw = serde_json::to_string(list).map_err(|source| RepositoryError::Encode {
            key: key.to_string(),
            source,
        })?;

        self.store.set(key, &raw)?;

        Ok(())
    }
}

impl<S: KeyValueStore> CartRepository for StoreRepository<S> {
    fn load(&self) -> Result<CartSnapshot, RepositoryError> {
        Ok(CartSnapshot {
            items: self.read_list(&self.keys.items)?,
            flash_discounts: self.read_list(&self.keys.flash_discounts)?,
        })
    }

    fn save(&mut self, snapshot: &CartSnapshot) -> Result<(), RepositoryError> {
        let keys = self.keys.clone();

        self.write_list(&keys.items, &snapshot.items)?;
        self.write_list(&keys.flash_discounts, &snapshot.flash_discounts)?;

        Ok(())
    }
}
