//! Shared helpers for unit and behavioural tests.

use std::sync::{Mutex, PoisonError};

use crate::aggregation::{FailureEntry, Progress, RunReport, RunSink, UserRecord};

/// One event captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A progress step.
    Progress(Progress),
    /// A produced record.
    Record(UserRecord),
    /// A failed identifier.
    Failure(FailureEntry),
    /// The final report and failure list.
    RunComplete(RunReport, Vec<FailureEntry>),
}

/// Sink that keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events captured so far.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Progress steps as `(completed, total)` pairs.
    #[must_use]
    pub fn progress(&self) -> Vec<(usize, usize)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RecordedEvent::Progress(progress) => Some((progress.completed, progress.total)),
                _ => None,
            })
            .collect()
    }

    /// Identifiers of emitted records, in order.
    #[must_use]
    pub fn record_identifiers(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RecordedEvent::Record(record) => Some(record.identifier.as_str().to_owned()),
                _ => None,
            })
            .collect()
    }

    /// Identifiers of emitted failures, in order.
    #[must_use]
    pub fn failure_identifiers(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RecordedEvent::Failure(failure) => Some(failure.identifier.as_str().to_owned()),
                _ => None,
            })
            .collect()
    }

    /// Reports delivered through `on_run_complete`.
    #[must_use]
    pub fn reports(&self) -> Vec<RunReport> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RecordedEvent::RunComplete(report, _) => Some(report),
                _ => None,
            })
            .collect()
    }

    /// Failure lists delivered through `on_run_complete`, as identifiers.
    #[must_use]
    pub fn final_failure_identifiers(&self) -> Vec<Vec<String>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RecordedEvent::RunComplete(_, failures) => Some(
                    failures
                        .iter()
                        .map(|failure| failure.identifier.as_str().to_owned())
                        .collect(),
                ),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: RecordedEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl RunSink for RecordingSink {
    fn on_progress(&self, progress: Progress) {
        self.push(RecordedEvent::Progress(progress));
    }

    fn on_record(&self, record: &UserRecord) {
        self.push(RecordedEvent::Record(record.clone()));
    }

    fn on_failure(&self, failure: &FailureEntry) {
        self.push(RecordedEvent::Failure(failure.clone()));
    }

    fn on_run_complete(&self, report: &RunReport, failures: &[FailureEntry]) {
        self.push(RecordedEvent::RunComplete(*report, failures.to_vec()));
    }
}
