//! In-memory store implementations.
//!
//! Used by tests and for exercising mappings without touching AWS. Clones
//! share state, so a test can hand one clone to the driver and inspect the
//! other afterwards.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::secret::SecretValue;
use crate::store::{CreateOutcome, DestinationStore, SourceStore};

#[derive(Default)]
struct SourceInner {
    values: HashMap<String, String>,
    failures: HashMap<String, StoreError>,
    calls: Vec<(String, bool)>,
}

/// In-memory parameter store.
#[derive(Clone, Default)]
pub struct MemorySourceStore {
    inner: Arc<Mutex<SourceInner>>,
    latency: Option<Duration>,
    key_latency: Arc<HashMap<String, Duration>>,
}

impl MemorySourceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    pub fn with_value(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.lock().values.insert(key.into(), value.into());
        self
    }

    /// Make lookups of `key` fail with `error`.
    pub fn with_failure(self, key: impl Into<String>, error: StoreError) -> Self {
        self.inner.lock().failures.insert(key.into(), error);
        self
    }

    /// Delay every lookup.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Delay lookups of one key, overriding the store-wide latency.
    pub fn with_key_latency(mut self, key: impl Into<String>, latency: Duration) -> Self {
        Arc::make_mut(&mut self.key_latency).insert(key.into(), latency);
        self
    }

    /// Keys requested so far, with their decrypt flag, in call order.
    pub fn calls(&self) -> Vec<(String, bool)> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl SourceStore for MemorySourceStore {
    async fn get_value(&self, key: &str, decrypt: bool) -> Result<Option<SecretValue>, StoreError> {
        self.inner.lock().calls.push((key.to_string(), decrypt));

        if let Some(delay) = self.key_latency.get(key).copied().or(self.latency) {
            tokio::time::sleep(delay).await;
        }

        let inner = self.inner.lock();
        if let Some(error) = inner.failures.get(key) {
            return Err(error.clone());
        }
        Ok(inner.values.get(key).map(|v| SecretValue::new(v.as_str())))
    }
}

#[derive(Default)]
struct DestinationInner {
    secrets: HashMap<String, String>,
    failures: HashMap<String, StoreError>,
    create_calls: Vec<String>,
    put_calls: Vec<String>,
}

/// In-memory secret store.
#[derive(Clone, Default)]
pub struct MemoryDestinationStore {
    inner: Arc<Mutex<DestinationInner>>,
    latency: Option<Duration>,
}

impl MemoryDestinationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing secret.
    pub fn with_secret(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.lock().secrets.insert(name.into(), value.into());
        self
    }

    /// Make writes to `name` fail with `error`.
    pub fn with_failure(self, name: impl Into<String>, error: StoreError) -> Self {
        self.inner.lock().failures.insert(name.into(), error);
        self
    }

    /// Delay every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Current value of a secret.
    pub fn get(&self, name: &str) -> Option<String> {
        self.inner.lock().secrets.get(name).cloned()
    }

    /// Number of stored secrets.
    pub fn len(&self) -> usize {
        self.inner.lock().secrets.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().secrets.is_empty()
    }

    /// Names passed to `create_secret`, in call order.
    pub fn create_calls(&self) -> Vec<String> {
        self.inner.lock().create_calls.clone()
    }

    /// Number of overwrite calls.
    pub fn put_count(&self) -> usize {
        self.inner.lock().put_calls.len()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl DestinationStore for MemoryDestinationStore {
    async fn create_secret(&self, name: &str, value: &SecretValue) -> Result<CreateOutcome, StoreError> {
        self.inner.lock().create_calls.push(name.to_string());
        self.delay().await;

        let mut inner = self.inner.lock();
        if let Some(error) = inner.failures.get(name) {
            return Err(error.clone());
        }
        if inner.secrets.contains_key(name) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        inner.secrets.insert(name.to_string(), value.expose().to_string());
        Ok(CreateOutcome::Created)
    }

    async fn put_secret_value(&self, name: &str, value: &SecretValue) -> Result<(), StoreError> {
        self.inner.lock().put_calls.push(name.to_string());
        self.delay().await;

        let mut inner = self.inner.lock();
        if let Some(error) = inner.failures.get(name) {
            return Err(error.clone());
        }
        match inner.secrets.get_mut(name) {
            Some(existing) => {
                *existing = value.expose().to_string();
                Ok(())
            }
            None => Err(StoreError::InvalidRequest(format!("secret {} does not exist", name))),
        }
    }
}
