//! AWS-backed stores for ssm-migrate.
//!
//! - [`SsmSourceStore`] reads parameters from SSM Parameter Store with decryption.
//! - [`SecretsManagerDestination`] creates secrets in Secrets Manager.
//! - [`resolve_saml_provider_arn`] looks up the federated identity provider.

pub mod config;
pub mod error;
pub mod identity;
pub mod secretsmanager;
pub mod ssm;

pub use config::AwsConfig;
pub use error::{classify, AwsError};
pub use identity::resolve_saml_provider_arn;
pub use secretsmanager::SecretsManagerDestination;
pub use ssm::SsmSourceStore;
