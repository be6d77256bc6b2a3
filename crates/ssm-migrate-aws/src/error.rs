//! AWS error types and error-code classification.

use ssm_migrate_core::StoreError;
use thiserror::Error;

/// Errors raised outside the per-item pipeline.
#[derive(Debug, Error)]
pub enum AwsError {
    /// No SAML identity provider with the requested name.
    #[error("SAML provider '{name}' not found")]
    ProviderNotFound {
        /// The provider name that was looked up.
        name: String,
    },

    /// IAM call failed.
    #[error("iam error: {0}")]
    Iam(String),
}

const THROTTLING_CODES: &[&str] = &[
    "ThrottlingException",
    "Throttling",
    "TooManyRequestsException",
    "RequestLimitExceeded",
    "TooManyUpdates",
];

const ACCESS_CODES: &[&str] = &[
    "AccessDeniedException",
    "AccessDenied",
    "UnrecognizedClientException",
    "ExpiredTokenException",
    "InvalidClientTokenId",
    "InvalidSignatureException",
];

const VALIDATION_CODES: &[&str] = &[
    "ValidationException",
    "InvalidParameterException",
    "InvalidRequestException",
    "InvalidKeyId",
    "MalformedPolicyDocumentException",
];

/// Map an AWS error code to a [`StoreError`].
///
/// A missing code means the request never produced a service response
/// (dispatch failure, connection error, SDK timeout).
pub fn classify(code: Option<&str>, message: String) -> StoreError {
    match code {
        Some(code) if THROTTLING_CODES.contains(&code) => StoreError::Throttled(message),
        Some(code) if ACCESS_CODES.contains(&code) => StoreError::AccessDenied(message),
        Some(code) if VALIDATION_CODES.contains(&code) => StoreError::InvalidRequest(message),
        Some(_) => StoreError::Service(message),
        None => StoreError::Unavailable(message),
    }
}
