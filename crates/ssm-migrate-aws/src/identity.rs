//! SAML identity-provider lookup.
//!
//! Operators reach the migration role through a federated SAML provider.
//! The provider's ARN is looked up once, awaited, and handed to whatever
//! needs it as a plain value.

use aws_config::SdkConfig;
use aws_sdk_iam::error::DisplayErrorContext;

use crate::error::AwsError;

const SAML_PROVIDER_RESOURCE: &str = ":saml-provider/";

/// Look up the ARN of the SAML provider called `name`.
pub async fn resolve_saml_provider_arn(config: &SdkConfig, name: &str) -> Result<String, AwsError> {
    let client = aws_sdk_iam::Client::new(config);
    let output = client
        .list_saml_providers()
        .send()
        .await
        .map_err(|err| AwsError::Iam(DisplayErrorContext(&err).to_string()))?;

    let arns = output
        .saml_provider_list()
        .iter()
        .filter_map(|provider| provider.arn());

    let arn = find_provider_arn(arns, name).ok_or_else(|| AwsError::ProviderNotFound {
        name: name.to_string(),
    })?;

    tracing::info!(provider = name, arn, "resolved SAML provider");
    Ok(arn.to_string())
}

/// Pick the ARN whose resource name is exactly `name`.
fn find_provider_arn<'a>(arns: impl IntoIterator<Item = &'a str>, name: &str) -> Option<&'a str> {
    arns.into_iter().find(|arn| {
        arn.split_once(SAML_PROVIDER_RESOURCE)
            .is_some_and(|(_, provider)| provider == name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARNS: &[&str] = &[
        "arn:aws:iam::123456789012:saml-provider/Okta",
        "arn:aws:iam::123456789012:saml-provider/OneLogin",
        "arn:aws:iam::123456789012:saml-provider/OneLoginLegacy",
    ];

    #[test]
    fn test_find_exact_name() {
        assert_eq!(
            find_provider_arn(ARNS.iter().copied(), "OneLogin"),
            Some("arn:aws:iam::123456789012:saml-provider/OneLogin")
        );
    }

    #[test]
    fn test_prefix_does_not_match() {
        assert_eq!(find_provider_arn(ARNS.iter().copied(), "One"), None);
    }

    #[test]
    fn test_missing_provider() {
        assert_eq!(find_provider_arn(ARNS.iter().copied(), "Azure"), None);
        assert_eq!(find_provider_arn(std::iter::empty(), "OneLogin"), None);
    }
}
