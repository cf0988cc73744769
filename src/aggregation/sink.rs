//! Observers notified while a run progresses.
//!
//! The pipeline reports to a [`RunSink`] synchronously: every record, every
//! failure and every progress step is delivered in processing order, and the
//! run ends with exactly one [`RunReport`].

use std::io::{self, Write};
use std::sync::Mutex;

use serde::Serialize;

use crate::github::rate_limit::RateLimitInfo;

use super::record::{FailureEntry, UserRecord};

/// Completed-of-total counter emitted after each identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Identifiers whose outcome is known.
    pub completed: usize,
    /// Identifiers in the run.
    pub total: usize,
}

impl Progress {
    /// Creates a progress value.
    #[must_use]
    pub const fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// Completion rounded to the nearest whole percent, halves rounding up.
    ///
    /// An empty run counts as fully complete.
    ///
    /// # Example
    ///
    /// ```
    /// use roster::aggregation::Progress;
    ///
    /// assert_eq!(Progress::new(1, 3).percentage(), 33);
    /// assert_eq!(Progress::new(2, 3).percentage(), 67);
    /// assert_eq!(Progress::new(0, 0).percentage(), 100);
    /// ```
    #[must_use]
    pub fn percentage(&self) -> usize {
        let numerator = self
            .completed
            .saturating_mul(200)
            .saturating_add(self.total);
        numerator
            .checked_div(self.total.saturating_mul(2))
            .unwrap_or(100)
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every identifier was attempted.
    Completed,
    /// The remaining quota fell below the threshold.
    RateLimited {
        /// Counters that triggered the stop.
        rate_limit: RateLimitInfo,
        /// Identifiers that were never attempted.
        skipped: usize,
    },
    /// A newer run started before this one finished.
    Superseded {
        /// Identifiers that were never attempted.
        skipped: usize,
    },
}

/// Summary delivered once when a run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Identifiers in the run.
    pub total: usize,
    /// Identifiers whose outcome was recorded.
    pub completed: usize,
    /// Records produced.
    pub successes: usize,
    /// Failures collected.
    pub failures: usize,
    /// Why the run stopped.
    pub outcome: RunOutcome,
}

/// Receives pipeline events in processing order.
pub trait RunSink: Send + Sync {
    /// Called after each identifier's outcome is recorded.
    fn on_progress(&self, progress: Progress);

    /// Called when a record is produced.
    fn on_record(&self, record: &UserRecord);

    /// Called when an identifier fails.
    fn on_failure(&self, failure: &FailureEntry);

    /// Called once when the run ends, with every failure in processing order.
    fn on_run_complete(&self, report: &RunReport, failures: &[FailureEntry]);
}

/// Sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRunSink;

impl RunSink for NoopRunSink {
    fn on_progress(&self, _progress: Progress) {}

    fn on_record(&self, _record: &UserRecord) {}

    fn on_failure(&self, _failure: &FailureEntry) {}

    fn on_run_complete(&self, _report: &RunReport, _failures: &[FailureEntry]) {}
}

/// A pipeline event in serialisable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent<'event> {
    /// Progress step.
    Progress {
        /// Identifiers whose outcome is known.
        completed: usize,
        /// Identifiers in the run.
        total: usize,
        /// Rounded completion percentage.
        percentage: usize,
    },
    /// A record was produced.
    Record {
        /// The record.
        record: &'event UserRecord,
    },
    /// An identifier failed.
    Failure {
        /// The failure.
        failure: &'event FailureEntry,
    },
    /// The run ended.
    RunComplete {
        /// The final report.
        report: &'event RunReport,
        /// Every failure of the run.
        failures: &'event [FailureEntry],
    },
}

/// Writes pipeline events as JSON lines (JSONL).
///
/// Write errors are ignored; events are diagnostics, not results.
#[derive(Debug)]
pub struct JsonlRunSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonlRunSink<W> {
    /// Wraps a writer.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the sink and returns the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn emit(&self, event: &RunEvent<'_>) {
        let Ok(serialised) = serde_json::to_string(event) else {
            return;
        };
        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        let _ignored = writeln!(writer, "{serialised}");
    }
}

impl JsonlRunSink<io::Stderr> {
    /// Sink writing to the process's standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> RunSink for JsonlRunSink<W> {
    fn on_progress(&self, progress: Progress) {
        self.emit(&RunEvent::Progress {
            completed: progress.completed,
            total: progress.total,
            percentage: progress.percentage(),
        });
    }

    fn on_record(&self, record: &UserRecord) {
        self.emit(&RunEvent::Record { record });
    }

    fn on_failure(&self, failure: &FailureEntry) {
        self.emit(&RunEvent::Failure { failure });
    }

    fn on_run_complete(&self, report: &RunReport, failures: &[FailureEntry]) {
        self.emit(&RunEvent::RunComplete { report, failures });
    }
}
