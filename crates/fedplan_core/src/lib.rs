//! Federal retirement scenario planning library
//!
//! This crate projects multi-decade retirement income for federal employees
//! and searches for parameter settings that satisfy a stated financial goal.
//! It provides:
//! - An immutable scenario-transformation pipeline (postpone retirement,
//!   delay Social Security, adjust TSP withdrawal strategy/rate, Roth
//!   conversion schedules, mortality assumptions)
//! - A registry that builds transforms from `name:key=value,...` spec strings
//!   and named transform templates
//! - A single-target solver (binary search for the TSP withdrawal rate,
//!   grid search for SS claim age and retirement date)
//! - A multi-dimensional optimizer that runs every target against every goal
//!   and reduces the results to best-by-metric recommendations
//! - A small deterministic projection engine implementing the
//!   `ScenarioEvaluator` contract for end-to-end use
//!
//! # Example
//!
//! ```ignore
//! use fedplan_core::solver::{Constraints, OptimizationGoal, OptimizationRequest,
//!     OptimizationTarget, optimize};
//! use fedplan_core::evaluate::SolveProgress;
//! use fedplan_core::projection::ProjectionEngine;
//!
//! let request = OptimizationRequest {
//!     scenario,
//!     config,
//!     target: OptimizationTarget::TspRate,
//!     goal: OptimizationGoal::MatchIncome,
//!     constraints: Constraints::new("Alice").target_income(90_000.0),
//!     max_iterations: 50,
//!     tolerance: 1_000.0,
//! };
//! let result = optimize(&ProjectionEngine, &SolveProgress::new(), &request)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod date_math;
pub mod error;
pub mod evaluate;
pub mod projection;
pub mod solver;
pub mod transform;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::PlanConfig;
pub use evaluate::{ScenarioEvaluator, SolveProgress};
pub use model::{ProjectionSummary, Scenario};
pub use transform::{ScenarioTransform, apply_transforms};
