//! ssm-migrate core - migration engine for copying parameters into a secret store.
//!
//! The engine reads a [`Mapping`] of parameter → secret pairs, resolves each
//! source value through a [`SourceStore`], writes it through a
//! [`DestinationStore`], and produces a [`MigrationReport`].
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use ssm_migrate_core::{Mapping, MigrationConfig, MigrationDriver};
//! use tokio_util::sync::CancellationToken;
//!
//! let mapping = Mapping::load("secrets.yml")?;
//! let driver = MigrationDriver::new(source, destination, MigrationConfig::default());
//! let report = driver.run(mapping.entries(), &CancellationToken::new()).await;
//!
//! println!("{} succeeded, {} failed", report.counts().succeeded, report.counts().failed);
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod mapping;
pub mod memory;
pub mod report;
pub mod resolver;
pub mod secret;
pub mod store;
pub mod writer;

pub use config::{MigrationConfig, DEFAULT_CALL_TIMEOUT, SUGGESTED_CONCURRENCY};
pub use driver::MigrationDriver;
pub use error::{Error, ItemError, Operation, Result, StoreError};
pub use mapping::{Mapping, MappingEntry, MappingWarning};
pub use memory::{MemoryDestinationStore, MemorySourceStore};
pub use report::{ItemStatus, MigrationItemResult, MigrationReport, ReportCounts, RunStatus};
pub use resolver::SourceResolver;
pub use secret::SecretValue;
pub use store::{CreateOutcome, DestinationStore, SourceStore};
pub use writer::{DestinationWriter, WriteOutcome};

/// Re-export so callers can construct cancellation tokens without a direct dependency.
pub use tokio_util::sync::CancellationToken;
