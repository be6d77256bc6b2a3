//! Store abstractions for the source parameter store and the destination
//! secret store.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::secret::SecretValue;

/// Read-only key/value lookup service holding the original values.
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Fetch the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the store has no such key.
    async fn get_value(&self, key: &str, decrypt: bool) -> Result<Option<SecretValue>, StoreError>;
}

/// Outcome of a create call on the destination store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new secret was created.
    Created,
    /// A secret with that name already exists; nothing was changed.
    AlreadyExists,
}

/// Secret-management service receiving migrated values.
#[async_trait]
pub trait DestinationStore: Send + Sync {
    /// Create a secret. Must not modify an existing secret.
    async fn create_secret(&self, name: &str, value: &SecretValue) -> Result<CreateOutcome, StoreError>;

    /// Overwrite the value of an existing secret.
    async fn put_secret_value(&self, name: &str, value: &SecretValue) -> Result<(), StoreError>;
}
