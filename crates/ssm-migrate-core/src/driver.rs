//! Migration driver - runs the resolve-then-write pipeline over a mapping.
//!
//! Items are processed strictly in order unless a concurrency limit is
//! configured, in which case a bounded pool of tasks runs them. Either way
//! every launched item is awaited before the report is finalized, and the
//! report lists items in mapping order.

use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::MigrationConfig;
use crate::error::ItemError;
use crate::mapping::MappingEntry;
use crate::report::{ItemStatus, MigrationItemResult, MigrationReport};
use crate::resolver::SourceResolver;
use crate::store::{DestinationStore, SourceStore};
use crate::writer::{DestinationWriter, WriteOutcome};

/// Per-item pipeline shared by the sequential and pooled paths.
#[derive(Clone)]
struct ItemPipeline {
    resolver: SourceResolver,
    writer: DestinationWriter,
    dry_run: bool,
}

impl ItemPipeline {
    async fn process(&self, index: usize, entry: &MappingEntry) -> MigrationItemResult {
        tracing::debug!(
            index,
            source_key = %entry.source_key,
            destination_key = %entry.destination_key,
            "resolving"
        );

        let value = match self.resolver.resolve(&entry.source_key).await {
            Ok(value) => value,
            Err(err) => return failed(index, entry, err),
        };

        if self.dry_run {
            return MigrationItemResult::new(index, entry.clone(), ItemStatus::Resolved)
                .with_detail("dry run; not written");
        }

        tracing::debug!(index, destination_key = %entry.destination_key, "writing");
        match self.writer.write(&entry.destination_key, &value).await {
            Ok(WriteOutcome::Created) => {
                MigrationItemResult::new(index, entry.clone(), ItemStatus::Success)
            }
            Ok(WriteOutcome::Updated) => {
                MigrationItemResult::new(index, entry.clone(), ItemStatus::Updated)
                    .with_detail("existing secret overwritten")
            }
            Ok(WriteOutcome::AlreadyExists) => {
                MigrationItemResult::new(index, entry.clone(), ItemStatus::AlreadyExists)
                    .with_detail("secret already exists; left unchanged")
            }
            Err(err) => failed(index, entry, err),
        }
    }
}

fn failed(index: usize, entry: &MappingEntry, err: ItemError) -> MigrationItemResult {
    let mut result =
        MigrationItemResult::new(index, entry.clone(), err.status()).with_detail(err.to_string());
    result.retryable = err.is_retryable();
    result
}

fn log_result(result: &MigrationItemResult) {
    let entry = &result.entry;
    let detail = result.detail.as_deref().unwrap_or("");
    if result.status.is_failure() {
        tracing::warn!(
            index = result.index,
            source_key = %entry.source_key,
            destination_key = %entry.destination_key,
            status = %result.status,
            retryable = result.retryable,
            detail,
            "item failed"
        );
    } else {
        tracing::info!(
            index = result.index,
            source_key = %entry.source_key,
            destination_key = %entry.destination_key,
            status = %result.status,
            "item done"
        );
    }
}

/// Drives a migration run.
pub struct MigrationDriver {
    pipeline: ItemPipeline,
    config: MigrationConfig,
}

impl MigrationDriver {
    /// Create a driver over the given stores.
    pub fn new(
        source: Arc<dyn SourceStore>,
        destination: Arc<dyn DestinationStore>,
        config: MigrationConfig,
    ) -> Self {
        let resolver = SourceResolver::new(source, config.call_timeout);
        let writer = DestinationWriter::new(destination, config.call_timeout)
            .with_force_update(config.force_update);

        Self {
            pipeline: ItemPipeline {
                resolver,
                writer,
                dry_run: config.dry_run,
            },
            config,
        }
    }

    /// Migrate every entry and return the finalized report.
    ///
    /// Item failures are recorded in the report and never returned as errors.
    /// Once `cancel` fires no further items are launched; items already in
    /// flight run to completion (or their call timeout) and the remaining
    /// entries are reported as cancelled.
    pub async fn run(&self, entries: &[MappingEntry], cancel: &CancellationToken) -> MigrationReport {
        tracing::info!(
            entries = entries.len(),
            concurrency = self.config.concurrency.map_or(1, NonZeroUsize::get),
            strict = self.config.strict,
            force_update = self.config.force_update,
            dry_run = self.config.dry_run,
            "starting migration"
        );

        let mut slots: Vec<Option<MigrationItemResult>> = vec![None; entries.len()];
        let mut launched = vec![false; entries.len()];

        match self.config.concurrency {
            Some(limit) if limit.get() > 1 => {
                self.run_pooled(entries, limit, cancel, &mut slots, &mut launched)
                    .await
            }
            _ => {
                self.run_sequential(entries, cancel, &mut slots, &mut launched)
                    .await
            }
        }

        let items: Vec<MigrationItemResult> = slots
            .into_iter()
            .zip(launched)
            .enumerate()
            .map(|(index, (slot, was_launched))| match slot {
                Some(result) => result,
                None if was_launched => {
                    let result = MigrationItemResult::new(
                        index,
                        entries[index].clone(),
                        ItemStatus::TransientError,
                    )
                    .with_detail("item task aborted before completing");
                    log_result(&result);
                    result
                }
                None => MigrationItemResult::new(index, entries[index].clone(), ItemStatus::Cancelled)
                    .with_detail("run cancelled before item started"),
            })
            .collect();

        let report = MigrationReport::finalize(items, self.config.strict, self.config.dry_run);
        let counts = report.counts();
        tracing::info!(
            status = %report.status(),
            succeeded = counts.succeeded,
            already_exists = counts.already_exists,
            failed = counts.failed,
            cancelled = counts.cancelled,
            "migration finished"
        );
        report
    }

    async fn run_sequential(
        &self,
        entries: &[MappingEntry],
        cancel: &CancellationToken,
        slots: &mut [Option<MigrationItemResult>],
        launched: &mut [bool],
    ) {
        for (index, entry) in entries.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::warn!(remaining = entries.len() - index, "run cancelled");
                break;
            }
            launched[index] = true;

            // Run on its own task so a panicking store call cannot take the
            // rest of the report with it.
            let pipeline = self.pipeline.clone();
            let entry = entry.clone();
            match tokio::spawn(async move { pipeline.process(index, &entry).await }).await {
                Ok(result) => {
                    log_result(&result);
                    slots[index] = Some(result);
                }
                Err(err) => {
                    tracing::error!(index, error = %err, "item task failed to complete");
                }
            }
        }
    }

    async fn run_pooled(
        &self,
        entries: &[MappingEntry],
        limit: NonZeroUsize,
        cancel: &CancellationToken,
        slots: &mut [Option<MigrationItemResult>],
        launched: &mut [bool],
    ) {
        let semaphore = Arc::new(Semaphore::new(limit.get()));
        let mut tasks = JoinSet::new();

        for (index, entry) in entries.iter().enumerate() {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                tracing::warn!(remaining = entries.len() - index, "run cancelled");
                break;
            };

            launched[index] = true;
            let pipeline = self.pipeline.clone();
            let entry = entry.clone();
            tasks.spawn(async move {
                let _permit = permit;
                pipeline.process(index, &entry).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    log_result(&result);
                    let index = result.index;
                    slots[index] = Some(result);
                }
                Err(err) => {
                    tracing::error!(error = %err, "item task failed to complete");
                }
            }
        }
    }
}
