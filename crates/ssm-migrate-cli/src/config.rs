//! Command-line arguments and their conversion into run configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use ssm_migrate_aws::AwsConfig;
use ssm_migrate_core::{MigrationConfig, DEFAULT_CALL_TIMEOUT};

use crate::formatter::OutputFormat;

/// Copy SSM Parameter Store values into Secrets Manager.
#[derive(Parser, Debug)]
#[command(name = "ssm-migrate")]
#[command(version, about = "Copy SSM Parameter Store values into Secrets Manager")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Migrate every entry of a mapping file
    Migrate(MigrateArgs),

    /// Validate a mapping file without contacting AWS
    Validate(ValidateArgs),

    /// Print the ARN of a SAML identity provider
    ProviderArn(ProviderArnArgs),
}

/// AWS connection options shared by subcommands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct AwsArgs {
    /// AWS region (defaults to the SDK provider chain)
    #[arg(long)]
    pub region: Option<String>,

    /// Named AWS profile
    #[arg(long)]
    pub profile: Option<String>,
}

impl AwsArgs {
    /// Convert into SDK configuration overrides.
    pub fn to_config(&self) -> AwsConfig {
        AwsConfig {
            region: self.region.clone(),
            profile: self.profile.clone(),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct MigrateArgs {
    /// Mapping file (YAML or JSON) with a top-level `secrets` list
    pub mapping: PathBuf,

    /// Items processed in parallel (0 = strictly sequential)
    #[arg(short = 'j', long, default_value_t = 0)]
    pub concurrency: usize,

    /// Exit non-zero if any item fails
    #[arg(long)]
    pub strict: bool,

    /// Overwrite secrets that already exist in Secrets Manager
    #[arg(long)]
    pub force_update: bool,

    /// Resolve parameters without writing any secret
    #[arg(long)]
    pub dry_run: bool,

    /// Per-call timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CALL_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// KMS key used to encrypt newly created secrets
    #[arg(long)]
    pub kms_key_id: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub aws: AwsArgs,
}

impl MigrateArgs {
    /// Build the engine configuration.
    pub fn migration_config(&self) -> MigrationConfig {
        MigrationConfig::new()
            .with_concurrency(self.concurrency)
            .with_call_timeout(Duration::from_secs(self.timeout))
            .with_strict(self.strict)
            .with_force_update(self.force_update)
            .with_dry_run(self.dry_run)
    }
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Mapping file (YAML or JSON)
    pub mapping: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct ProviderArnArgs {
    /// Provider name as shown in IAM
    pub name: String,

    #[command(flatten)]
    pub aws: AwsArgs,
}
