//! ssm-migrate - copy SSM Parameter Store values into Secrets Manager.

mod config;
mod formatter;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use config::{Args, Command, MigrateArgs, ProviderArnArgs, ValidateArgs};
use ssm_migrate_aws::{resolve_saml_provider_arn, SecretsManagerDestination, SsmSourceStore};
use ssm_migrate_core::{CancellationToken, Mapping, MigrationDriver, MigrationReport, RunStatus};

/// Fatal error before or outside the run (bad mapping, AWS setup).
const EXIT_FATAL: u8 = 1;

/// Strict run with failed items.
const EXIT_ITEMS_FAILED: u8 = 2;

/// Run interrupted by the operator.
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr so stdout carries only the report.
    let default_level = if args.verbose { "ssm_migrate=debug" } else { "ssm_migrate=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run(command: Command) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Command::Migrate(args) => run_migrate(args).await,
        Command::Validate(args) => run_validate(args),
        Command::ProviderArn(args) => run_provider_arn(args).await,
    }
}

/// Load the mapping, migrate every entry, print the report.
async fn run_migrate(args: MigrateArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    // A malformed mapping aborts before any store is contacted.
    let mapping = Mapping::load(&args.mapping)?;
    let config = args.migration_config();

    let sdk = args.aws.to_config().load().await;
    let source = SsmSourceStore::from_conf(&sdk);
    let mut destination = SecretsManagerDestination::from_conf(&sdk);
    if let Some(kms_key_id) = &args.kms_key_id {
        destination = destination.with_kms_key_id(kms_key_id.clone());
    }

    let driver = MigrationDriver::new(Arc::new(source), Arc::new(destination), config);

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl+c");
                return;
            }
            match on_interrupt(&cancel_on_signal) {
                Interrupt::Drain => {
                    tracing::warn!("interrupt received, finishing in-flight items (ctrl+c again to exit)");
                }
                Interrupt::Exit => {
                    tracing::warn!("second interrupt received, exiting");
                    std::process::exit(i32::from(EXIT_CANCELLED));
                }
            }
        }
    });

    let report = driver.run(mapping.entries(), &cancel).await;

    let formatter = formatter::create_formatter(args.format);
    println!("{}", formatter.format_report(&report, mapping.warnings()));

    Ok(ExitCode::from(exit_status(&report, cancel.is_cancelled())))
}

/// What an operator interrupt should do.
#[derive(Debug, PartialEq, Eq)]
enum Interrupt {
    /// Stop launching items and let in-flight ones finish.
    Drain,
    /// Already draining; leave immediately.
    Exit,
}

fn on_interrupt(cancel: &CancellationToken) -> Interrupt {
    if cancel.is_cancelled() {
        Interrupt::Exit
    } else {
        cancel.cancel();
        Interrupt::Drain
    }
}

/// Parse and validate a mapping without contacting AWS.
fn run_validate(args: ValidateArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mapping = Mapping::load(&args.mapping)?;
    let formatter = formatter::create_formatter(args.format);
    println!("{}", formatter.format_mapping(&mapping));
    Ok(ExitCode::SUCCESS)
}

/// Resolve the SAML provider ARN and print it.
async fn run_provider_arn(args: ProviderArnArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let sdk = args.aws.to_config().load().await;
    let arn = resolve_saml_provider_arn(&sdk, &args.name).await?;
    println!("{}", arn);
    Ok(ExitCode::SUCCESS)
}

/// `interrupted` covers a signal that arrived after the last item launched.
fn exit_status(report: &MigrationReport, interrupted: bool) -> u8 {
    if interrupted || report.was_cancelled() {
        EXIT_CANCELLED
    } else if report.status() == RunStatus::Failed {
        EXIT_ITEMS_FAILED
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssm_migrate_core::{ItemStatus, MappingEntry, MigrationItemResult};

    fn report(statuses: &[ItemStatus], strict: bool) -> MigrationReport {
        let items = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                MigrationItemResult::new(i, MappingEntry::new(format!("/p{}", i), format!("s{}", i)), *status)
            })
            .collect();
        MigrationReport::finalize(items, strict, false)
    }

    #[test]
    fn test_exit_status_success() {
        assert_eq!(exit_status(&report(&[ItemStatus::Success, ItemStatus::AlreadyExists], true), false), 0);
    }

    #[test]
    fn test_exit_status_lenient_failure() {
        assert_eq!(exit_status(&report(&[ItemStatus::Success, ItemStatus::NotFound], false), false), 0);
    }

    #[test]
    fn test_exit_status_strict_failure() {
        assert_eq!(
            exit_status(&report(&[ItemStatus::Success, ItemStatus::TransientError], true), false),
            EXIT_ITEMS_FAILED
        );
    }

    #[test]
    fn test_exit_status_cancelled() {
        assert_eq!(
            exit_status(&report(&[ItemStatus::Success, ItemStatus::Cancelled], false), false),
            EXIT_CANCELLED
        );
    }

    #[test]
    fn test_exit_status_interrupted_after_last_launch() {
        let finished = report(&[ItemStatus::Success, ItemStatus::Success], false);
        assert!(!finished.was_cancelled());
        assert_eq!(exit_status(&finished, true), EXIT_CANCELLED);

        let strict_failed = report(&[ItemStatus::NotFound], true);
        assert_eq!(exit_status(&strict_failed, true), EXIT_CANCELLED);
    }

    #[test]
    fn test_second_interrupt_exits() {
        let cancel = CancellationToken::new();
        assert_eq!(on_interrupt(&cancel), Interrupt::Drain);
        assert!(cancel.is_cancelled());
        assert_eq!(on_interrupt(&cancel), Interrupt::Exit);
    }
}
