//! Source resolver: fetch and decrypt one value from the parameter store.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{ItemError, Operation};
use crate::secret::SecretValue;
use crate::store::SourceStore;

/// Resolves source keys to values, classifying not-found and transient failures.
#[derive(Clone)]
pub struct SourceResolver {
    store: Arc<dyn SourceStore>,
    timeout: Duration,
}

impl SourceResolver {
    /// Create a resolver over `store` with a per-call timeout.
    pub fn new(store: Arc<dyn SourceStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Fetch the decrypted value for `key`.
    pub async fn resolve(&self, key: &str) -> Result<SecretValue, ItemError> {
        let call = self.store.get_value(key, true);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(Some(value))) => Ok(value),
            Ok(Ok(None)) => Err(ItemError::NotFound {
                key: key.to_string(),
            }),
            Ok(Err(source)) => Err(ItemError::Transient {
                operation: Operation::Resolve,
                source,
            }),
            Err(_) => Err(ItemError::Timeout {
                operation: Operation::Resolve,
                after: self.timeout,
            }),
        }
    }
}
