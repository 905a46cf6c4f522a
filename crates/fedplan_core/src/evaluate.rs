//! The scenario evaluation seam
//!
//! The solver treats the calculation engine as a black box behind the
//! `ScenarioEvaluator` trait: build a candidate scenario, hand it over,
//! consume the `ProjectionSummary` that comes back. The engine must be
//! side-effect-free on its inputs; the solver relies on that for lock-free
//! concurrent safety.
//!
//! `SolveProgress` is the cancellation/progress handle threaded through
//! every solver loop. Each iteration checks it immediately before the
//! evaluation call, so cancellation latency is bounded by one evaluation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::config::PlanConfig;
use crate::error::EvaluateError;
use crate::model::{ProjectionSummary, Scenario};

/// Evaluation contract consumed by the solver.
///
/// Implementations must be deterministic for a given (config, scenario)
/// pair and must not mutate either input.
pub trait ScenarioEvaluator {
    fn evaluate(
        &self,
        progress: &SolveProgress,
        config: &PlanConfig,
        scenario: &Scenario,
    ) -> Result<ProjectionSummary, EvaluateError>;
}

/// Progress tracking and cancellation for a solver run
#[derive(Debug, Clone)]
pub struct SolveProgress {
    /// Completed evaluations counter
    completed: Arc<AtomicUsize>,
    /// Planned evaluations; each search adds its grid size (or iteration
    /// cap) before iterating, so multi-dimensional runs accumulate
    total: Arc<AtomicUsize>,
    /// Cancellation flag
    cancelled: Arc<AtomicBool>,
}

impl SolveProgress {
    #[must_use]
    pub fn new() -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(0)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create from existing atomics (for embedding in a UI or server)
    pub fn from_atomics(
        completed: Arc<AtomicUsize>,
        total: Arc<AtomicUsize>,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            completed,
            total,
            cancelled,
        }
    }

    /// Get the number of completed evaluations
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Get the number of planned evaluations
    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Add a search's planned evaluations to the total
    pub fn add_total(&self, planned: usize) {
        self.total.fetch_add(planned, Ordering::Relaxed);
    }

    /// Increment the completed counter
    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Cancel the run
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Check if cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Default for SolveProgress {
    fn default() -> Self {
        Self::new()
    }
}
