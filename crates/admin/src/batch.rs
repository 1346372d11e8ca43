//! Structured outcome of a continue-on-error batch run.

use crate::error::AdminError;

/// A single failed item in a batch.
#[derive(Debug)]
pub struct BatchFailure {
    /// Operator-facing label of the item that failed.
    pub label: String,
    pub error: AdminError,
}

/// The complete, typed result of a sequential batch operation.
///
/// One item's failure never aborts the rest of the batch; callers get both
/// lists and decide how to present a partial failure.
#[derive(Debug, Default)]
pub struct BatchReport<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<BatchFailure>,
}

impl<T> BatchReport<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn record_success(&mut self, item: T) {
        self.succeeded.push(item);
    }

    pub fn record_failure(&mut self, label: impl Into<String>, error: AdminError) {
        self.failed.push(BatchFailure {
            label: label.into(),
            error,
        });
    }

    /// Whether every item succeeded.
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Whether nothing succeeded.
    #[must_use]
    pub fn is_complete_failure(&self) -> bool {
        self.succeeded.is_empty() && !self.failed.is_empty()
    }

    /// Aggregate line for the operator, e.g. `4 succeeded, 1 failed`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} succeeded, {} failed",
            self.succeeded.len(),
            self.failed.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_both_sides() {
        let mut report = BatchReport::new();
        for n in 0..4 {
            report.record_success(n);
        }
        report.record_failure("item 5", AdminError::validation("bad price"));

        assert_eq!(report.summary(), "4 succeeded, 1 failed");
        assert!(!report.is_complete_success());
        assert!(!report.is_complete_failure());
    }

    #[test]
    fn test_empty_report_is_success() {
        let report: BatchReport<()> = BatchReport::new();
        assert!(report.is_complete_success());
        assert!(!report.is_complete_failure());
    }
}
