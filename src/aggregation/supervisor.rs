//! Run supersession.
//!
//! Each call to [`RunSupervisor::begin`] starts a new generation and hands
//! out a [`RunTicket`]. A ticket stays current until the next `begin`, so a
//! pipeline holding an old ticket can notice that it has been replaced and
//! stop without reporting further results.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Issues run tickets; cloning shares the generation counter.
#[derive(Debug, Clone, Default)]
pub struct RunSupervisor {
    generation: Arc<AtomicU64>,
}

impl RunSupervisor {
    /// Creates a supervisor with no active run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new run, superseding any earlier ticket.
    #[must_use]
    pub fn begin(&self) -> RunTicket {
        let generation = self
            .generation
            .fetch_add(1, Ordering::AcqRel)
            .wrapping_add(1);
        RunTicket {
            generation,
            current: Arc::clone(&self.generation),
        }
    }
}

/// Proof that a run was started; checked between identifiers.
#[derive(Debug, Clone)]
pub struct RunTicket {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl RunTicket {
    /// A ticket that is never superseded, for callers without a supervisor.
    #[must_use]
    pub fn detached() -> Self {
        RunSupervisor::new().begin()
    }

    /// Returns true while no newer run has begun.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.generation
    }
}
