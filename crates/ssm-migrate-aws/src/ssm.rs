//! SSM Parameter Store as the migration source.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata};
use ssm_migrate_core::{SecretValue, SourceStore, StoreError};

use crate::error::classify;

/// Reads parameters with `GetParameter`.
#[derive(Debug, Clone)]
pub struct SsmSourceStore {
    client: aws_sdk_ssm::Client,
}

impl SsmSourceStore {
    /// Wrap an existing client.
    pub fn new(client: aws_sdk_ssm::Client) -> Self {
        Self { client }
    }

    /// Build a client from SDK configuration.
    pub fn from_conf(config: &SdkConfig) -> Self {
        Self::new(aws_sdk_ssm::Client::new(config))
    }
}

#[async_trait]
impl SourceStore for SsmSourceStore {
    async fn get_value(&self, key: &str, decrypt: bool) -> Result<Option<SecretValue>, StoreError> {
        let result = self
            .client
            .get_parameter()
            .name(key)
            .with_decryption(decrypt)
            .send()
            .await;

        match result {
            Ok(output) => Ok(output
                .parameter()
                .and_then(|parameter| parameter.value())
                .map(SecretValue::new)),
            Err(err) => {
                let message = DisplayErrorContext(&err).to_string();
                let service_err = err.into_service_error();
                if service_err.is_parameter_not_found() {
                    return Ok(None);
                }
                tracing::debug!(parameter = key, code = ?service_err.code(), "get_parameter failed");
                Err(classify(service_err.code(), message))
            }
        }
    }
}
