//! Output formatting utilities for CLI operations.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use roster::{
    FailureEntry, IntakeError, Progress, RunOutcome, RunReport, RunSink, UserRecord,
};

const TABLE_HEADER: [&str; 9] = [
    "Username",
    "Name",
    "Total Stars",
    "Total Forks",
    "Public Repos",
    "Followers",
    "Company",
    "Organizations",
    "Bio",
];

const MISSING: &str = "N/A";

/// Writes records as a tab-separated table with a header row.
pub fn write_table<W: Write>(writer: &mut W, records: &[UserRecord]) -> Result<(), IntakeError> {
    writeln!(writer, "{}", TABLE_HEADER.join("\t")).map_err(|error| io_error(&error))?;
    for record in records {
        let row = [
            record.identifier.to_string(),
            optional_cell(record.name.as_deref()),
            record.total_stars.to_string(),
            record.total_forks.to_string(),
            record.public_repos.to_string(),
            record.followers.to_string(),
            optional_cell(record.company.as_deref()),
            cell(&record.organizations.to_string()),
            optional_cell(record.bio.as_deref()),
        ];
        writeln!(writer, "{}", row.join("\t")).map_err(|error| io_error(&error))?;
    }
    Ok(())
}

/// Writes the failure list and the run outcome.
pub fn write_run_summary<W: Write>(
    writer: &mut W,
    failures: &[FailureEntry],
    report: &RunReport,
) -> Result<(), IntakeError> {
    writeln!(
        writer,
        "Processed {} of {} accounts: {} succeeded, {} failed.",
        report.completed, report.total, report.successes, report.failures
    )
    .map_err(|error| io_error(&error))?;

    for failure in failures {
        writeln!(writer, "  {}: {}", failure.identifier, failure.reason)
            .map_err(|error| io_error(&error))?;
    }

    match report.outcome {
        RunOutcome::Completed => {}
        RunOutcome::RateLimited {
            rate_limit,
            skipped,
        } => {
            writeln!(
                writer,
                "Stopped early: only {} API calls remain; {skipped} accounts were not attempted. \
                 The quota resets at {}.",
                rate_limit.remaining(),
                rate_limit.reset_display()
            )
            .map_err(|error| io_error(&error))?;
        }
        RunOutcome::Superseded { skipped } => {
            writeln!(
                writer,
                "Run superseded; {skipped} accounts were not attempted."
            )
            .map_err(|error| io_error(&error))?;
        }
    }
    Ok(())
}

/// Sink printing one human-readable line per event.
#[derive(Debug)]
pub struct ProgressLineSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> ProgressLineSink<W> {
    /// Wraps a writer.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn line(&self, message: &str) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ignored = writeln!(writer, "{message}");
    }
}

impl ProgressLineSink<io::Stderr> {
    /// Sink writing to standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> RunSink for ProgressLineSink<W> {
    fn on_progress(&self, progress: Progress) {
        self.line(&format!(
            "[{:>3}%] {}/{}",
            progress.percentage(),
            progress.completed,
            progress.total
        ));
    }

    fn on_record(&self, record: &UserRecord) {
        self.line(&format!("loaded {}", record.identifier));
    }

    fn on_failure(&self, failure: &FailureEntry) {
        self.line(&format!("failed {}: {}", failure.identifier, failure.reason));
    }

    fn on_run_complete(&self, _report: &RunReport, _failures: &[FailureEntry]) {}
}

fn optional_cell(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map_or_else(|| MISSING.to_owned(), cell)
}

/// Keeps a value on one table cell by folding tabs and line breaks.
fn cell(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Converts an I/O error to an [`IntakeError::Io`].
pub(crate) fn io_error(error: &io::Error) -> IntakeError {
    IntakeError::Io {
        message: error.to_string(),
    }
}
