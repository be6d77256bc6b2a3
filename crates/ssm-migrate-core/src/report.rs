//! Migration report: per-item outcomes and run summary.

use serde::Serialize;

use crate::mapping::MappingEntry;

/// Terminal status of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Value resolved but not written (dry run).
    Resolved,
    /// Source key does not exist.
    NotFound,
    /// Destination secret already existed and was left untouched.
    AlreadyExists,
    /// A store call failed or timed out.
    TransientError,
    /// Destination secret created.
    Success,
    /// Existing destination secret overwritten (force update).
    Updated,
    /// Not launched because the run was cancelled.
    Cancelled,
}

impl ItemStatus {
    /// Whether this status counts as a failed item.
    pub fn is_failure(&self) -> bool {
        matches!(self, ItemStatus::NotFound | ItemStatus::TransientError)
    }

    /// Whether the destination now holds the migrated value.
    pub fn is_migrated(&self) -> bool {
        matches!(self, ItemStatus::Success | ItemStatus::Updated)
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::Resolved => write!(f, "resolved"),
            ItemStatus::NotFound => write!(f, "not_found"),
            ItemStatus::AlreadyExists => write!(f, "already_exists"),
            ItemStatus::TransientError => write!(f, "transient_error"),
            ItemStatus::Success => write!(f, "success"),
            ItemStatus::Updated => write!(f, "updated"),
            ItemStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Outcome of one mapping entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationItemResult {
    /// Position of the entry in the mapping.
    pub index: usize,
    /// The mapping entry.
    pub entry: MappingEntry,
    /// Terminal status.
    pub status: ItemStatus,
    /// Error or informational detail. Never contains a secret value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Whether re-running the job may fix this item.
    pub retryable: bool,
}

impl MigrationItemResult {
    /// Create a result with no detail.
    pub fn new(index: usize, entry: MappingEntry, status: ItemStatus) -> Self {
        Self {
            index,
            entry,
            status,
            detail: None,
            retryable: status == ItemStatus::TransientError,
        }
    }

    /// Attach a detail message.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every item succeeded or was already migrated.
    Success,
    /// Some items failed or were not processed, and the run is lenient.
    PartialSuccess,
    /// Strict run with at least one failed item.
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::PartialSuccess => write!(f, "partial_success"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Aggregate counts over a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportCounts {
    /// Created, updated, or (in a dry run) resolved.
    pub succeeded: usize,
    /// Skipped because the destination already existed.
    pub already_exists: usize,
    /// `NotFound` or `TransientError`.
    pub failed: usize,
    /// Of the failures, how many are retryable.
    pub retryable: usize,
    /// Not launched due to cancellation.
    pub cancelled: usize,
}

impl ReportCounts {
    fn tally(results: &[MigrationItemResult]) -> Self {
        let mut counts = Self::default();
        for result in results {
            match result.status {
                ItemStatus::Success | ItemStatus::Updated | ItemStatus::Resolved => {
                    counts.succeeded += 1
                }
                ItemStatus::AlreadyExists => counts.already_exists += 1,
                ItemStatus::NotFound | ItemStatus::TransientError => counts.failed += 1,
                ItemStatus::Cancelled => counts.cancelled += 1,
            }
            if result.retryable {
                counts.retryable += 1;
            }
        }
        counts
    }

    /// Items that were not written in this run without being a failure.
    pub fn skipped(&self) -> usize {
        self.already_exists + self.cancelled
    }

    /// Total number of items.
    pub fn total(&self) -> usize {
        self.succeeded + self.already_exists + self.failed + self.cancelled
    }
}

/// Finalized result of a migration run, in mapping order.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    status: RunStatus,
    counts: ReportCounts,
    strict: bool,
    dry_run: bool,
    cancelled: bool,
    items: Vec<MigrationItemResult>,
}

impl MigrationReport {
    /// Finalize a report from results already in mapping order.
    pub fn finalize(items: Vec<MigrationItemResult>, strict: bool, dry_run: bool) -> Self {
        let counts = ReportCounts::tally(&items);
        let cancelled = counts.cancelled > 0;
        let status = if strict && counts.failed > 0 {
            RunStatus::Failed
        } else if counts.failed > 0 || cancelled {
            RunStatus::PartialSuccess
        } else {
            RunStatus::Success
        };

        Self {
            status,
            counts,
            strict,
            dry_run,
            cancelled,
            items,
        }
    }

    /// Overall run status.
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Aggregate counts.
    pub fn counts(&self) -> &ReportCounts {
        &self.counts
    }

    /// Per-item results in mapping order.
    pub fn items(&self) -> &[MigrationItemResult] {
        &self.items
    }

    /// Whether the run was cancelled before every item was launched.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Whether the run was strict.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Whether the run was a dry run.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Failed items only.
    pub fn failures(&self) -> impl Iterator<Item = &MigrationItemResult> {
        self.items.iter().filter(|item| item.status.is_failure())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(index: usize, status: ItemStatus) -> MigrationItemResult {
        MigrationItemResult::new(
            index,
            MappingEntry::new(format!("/p/{}", index), format!("s-{}", index)),
            status,
        )
    }

    #[test]
    fn test_all_success() {
        let report = MigrationReport::finalize(
            vec![item(0, ItemStatus::Success), item(1, ItemStatus::AlreadyExists)],
            true,
            false,
        );
        assert_eq!(report.status(), RunStatus::Success);
        assert_eq!(report.counts().succeeded, 1);
        assert_eq!(report.counts().already_exists, 1);
        assert_eq!(report.counts().skipped(), 1);
        assert_eq!(report.counts().total(), 2);
    }

    #[test]
    fn test_failures_lenient_vs_strict() {
        let items = vec![
            item(0, ItemStatus::Success),
            item(1, ItemStatus::NotFound),
            item(2, ItemStatus::TransientError),
        ];

        let lenient = MigrationReport::finalize(items.clone(), false, false);
        assert_eq!(lenient.status(), RunStatus::PartialSuccess);
        assert_eq!(lenient.counts().failed, 2);
        assert_eq!(lenient.counts().retryable, 1);
        assert_eq!(lenient.failures().count(), 2);

        let strict = MigrationReport::finalize(items, true, false);
        assert_eq!(strict.status(), RunStatus::Failed);
    }

    #[test]
    fn test_cancelled_is_partial() {
        let report = MigrationReport::finalize(
            vec![item(0, ItemStatus::Success), item(1, ItemStatus::Cancelled)],
            true,
            false,
        );
        assert!(report.was_cancelled());
        assert_eq!(report.status(), RunStatus::PartialSuccess);
        assert_eq!(report.counts().skipped(), 1);
    }

    #[test]
    fn test_empty_report() {
        let report = MigrationReport::finalize(Vec::new(), true, false);
        assert_eq!(report.status(), RunStatus::Success);
        assert_eq!(report.counts().total(), 0);
    }

    #[test]
    fn test_retryable_flag() {
        assert!(item(0, ItemStatus::TransientError).retryable);
        assert!(!item(0, ItemStatus::NotFound).retryable);
        assert!(!item(0, ItemStatus::Success).retryable);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ItemStatus::AlreadyExists.to_string(), "already_exists");
        assert_eq!(RunStatus::PartialSuccess.to_string(), "partial_success");
    }
}
