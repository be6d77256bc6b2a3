//! Migration run configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

/// Default per-call timeout for resolve and write calls.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Concurrency suggested when an operator opts into parallel processing.
pub const SUGGESTED_CONCURRENCY: usize = 5;

/// Migration run configuration.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Maximum items in flight. `None` processes items strictly one at a time.
    pub concurrency: Option<NonZeroUsize>,

    /// Timeout applied to each individual resolve or write call.
    pub call_timeout: Duration,

    /// Treat any failed item as a failed run.
    pub strict: bool,

    /// Overwrite destination secrets that already exist.
    pub force_update: bool,

    /// Resolve values without writing anything.
    pub dry_run: bool,
}

impl MigrationConfig {
    /// Create a sequential, lenient, create-only configuration.
    pub fn new() -> Self {
        Self {
            concurrency: None,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            strict: false,
            force_update: false,
            dry_run: false,
        }
    }

    /// Set the concurrency limit. `0` means sequential.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = NonZeroUsize::new(limit);
        self
    }

    /// Set the per-call timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Enable or disable strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable or disable overwriting existing secrets.
    pub fn with_force_update(mut self, force_update: bool) -> Self {
        self.force_update = force_update;
        self
    }

    /// Enable or disable dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Check if items are processed one at a time.
    pub fn is_sequential(&self) -> bool {
        self.concurrency.map_or(true, |limit| limit.get() == 1)
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MigrationConfig::default();
        assert!(config.concurrency.is_none());
        assert!(config.is_sequential());
        assert_eq!(config.call_timeout, DEFAULT_CALL_TIMEOUT);
        assert!(!config.strict);
        assert!(!config.force_update);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_config_builder() {
        let config = MigrationConfig::new()
            .with_concurrency(SUGGESTED_CONCURRENCY)
            .with_call_timeout(Duration::from_secs(5))
            .with_strict(true)
            .with_force_update(true)
            .with_dry_run(true);

        assert_eq!(config.concurrency.map(|c| c.get()), Some(5));
        assert!(!config.is_sequential());
        assert_eq!(config.call_timeout, Duration::from_secs(5));
        assert!(config.strict);
        assert!(config.force_update);
        assert!(config.dry_run);
    }

    #[test]
    fn test_zero_concurrency_is_sequential() {
        let config = MigrationConfig::new().with_concurrency(0);
        assert!(config.concurrency.is_none());
        assert!(config.is_sequential());
    }
}
