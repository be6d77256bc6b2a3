//! AWS SDK configuration.

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Region and profile overrides for the AWS SDK.
///
/// Unset fields fall back to the SDK's default provider chain
/// (environment, shared config files, instance metadata).
#[derive(Debug, Clone, Default)]
pub struct AwsConfig {
    /// Region override.
    pub region: Option<String>,

    /// Named profile from the shared config files.
    pub profile: Option<String>,
}

impl AwsConfig {
    /// Use the default provider chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the profile.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Resolve credentials and region into an SDK configuration.
    pub async fn load(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }

        let config = loader.load().await;
        tracing::debug!(
            region = ?config.region().map(|r| r.as_ref()),
            profile = ?self.profile,
            "aws configuration loaded"
        );
        config
    }
}
