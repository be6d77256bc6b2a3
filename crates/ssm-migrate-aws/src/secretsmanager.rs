//! Secrets Manager as the migration destination.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata};
use ssm_migrate_core::{CreateOutcome, DestinationStore, SecretValue, StoreError};

use crate::error::classify;

/// Creates secrets with `CreateSecret` and overwrites them with `PutSecretValue`.
#[derive(Debug, Clone)]
pub struct SecretsManagerDestination {
    client: aws_sdk_secretsmanager::Client,
    kms_key_id: Option<String>,
}

impl SecretsManagerDestination {
    /// Wrap an existing client.
    pub fn new(client: aws_sdk_secretsmanager::Client) -> Self {
        Self {
            client,
            kms_key_id: None,
        }
    }

    /// Build a client from SDK configuration.
    pub fn from_conf(config: &SdkConfig) -> Self {
        Self::new(aws_sdk_secretsmanager::Client::new(config))
    }

    /// Encrypt newly created secrets with this KMS key instead of the account default.
    pub fn with_kms_key_id(mut self, kms_key_id: impl Into<String>) -> Self {
        self.kms_key_id = Some(kms_key_id.into());
        self
    }
}

#[async_trait]
impl DestinationStore for SecretsManagerDestination {
    async fn create_secret(&self, name: &str, value: &SecretValue) -> Result<CreateOutcome, StoreError> {
        let result = self
            .client
            .create_secret()
            .name(name)
            .secret_string(value.expose())
            .set_kms_key_id(self.kms_key_id.clone())
            .send()
            .await;

        match result {
            Ok(_) => Ok(CreateOutcome::Created),
            Err(err) => {
                let message = DisplayErrorContext(&err).to_string();
                let service_err = err.into_service_error();
                if service_err.is_resource_exists_exception() {
                    return Ok(CreateOutcome::AlreadyExists);
                }
                tracing::debug!(secret = name, code = ?service_err.code(), "create_secret failed");
                Err(classify(service_err.code(), message))
            }
        }
    }

    async fn put_secret_value(&self, name: &str, value: &SecretValue) -> Result<(), StoreError> {
        self.client
            .put_secret_value()
            .secret_id(name)
            .secret_string(value.expose())
            .send()
            .await
            .map(|_| ())
            .map_err(|err| {
                let message = DisplayErrorContext(&err).to_string();
                let service_err = err.into_service_error();
                tracing::debug!(secret = name, code = ?service_err.code(), "put_secret_value failed");
                classify(service_err.code(), message)
            })
    }
}
