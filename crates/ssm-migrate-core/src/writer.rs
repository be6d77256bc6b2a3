//! Destination writer: create (or, when forced, overwrite) one secret.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{ItemError, Operation, StoreError};
use crate::secret::SecretValue;
use crate::store::{CreateOutcome, DestinationStore};

/// Outcome of a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A new secret was created.
    Created,
    /// The secret already existed and was left unchanged.
    AlreadyExists,
    /// The secret already existed and its value was overwritten.
    Updated,
}

/// Writes secrets to the destination store.
///
/// Existing secrets are never overwritten unless `force_update` is set, so a
/// migration can be re-run safely.
#[derive(Clone)]
pub struct DestinationWriter {
    store: Arc<dyn DestinationStore>,
    timeout: Duration,
    force_update: bool,
}

impl DestinationWriter {
    /// Create a create-only writer over `store` with a per-call timeout.
    pub fn new(store: Arc<dyn DestinationStore>, timeout: Duration) -> Self {
        Self {
            store,
            timeout,
            force_update: false,
        }
    }

    /// Overwrite existing secrets instead of skipping them.
    pub fn with_force_update(mut self, force_update: bool) -> Self {
        self.force_update = force_update;
        self
    }

    /// Write `value` under `name`.
    pub async fn write(&self, name: &str, value: &SecretValue) -> Result<WriteOutcome, ItemError> {
        let created = self.call(self.store.create_secret(name, value)).await?;
        match created {
            CreateOutcome::Created => Ok(WriteOutcome::Created),
            CreateOutcome::AlreadyExists if !self.force_update => Ok(WriteOutcome::AlreadyExists),
            CreateOutcome::AlreadyExists => {
                tracing::debug!(secret = name, "secret exists, overwriting value");
                self.call(self.store.put_secret_value(name, value)).await?;
                Ok(WriteOutcome::Updated)
            }
        }
    }

    async fn call<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T, StoreError>>,
    ) -> Result<T, ItemError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(ItemError::Transient {
                operation: Operation::Write,
                source,
            }),
            Err(_) => Err(ItemError::Timeout {
                operation: Operation::Write,
                after: self.timeout,
            }),
        }
    }
}
