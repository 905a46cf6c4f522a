//! Integration tests for the fedplan solver
//!
//! Tests are organized by topic:
//! - `solver_rate` - TSP withdrawal rate bisection and sweep
//! - `solver_grid` - SS claim age and retirement date grids
//! - `solver_multi` - Multi-dimensional runs and recommendations
//! - `end_to_end` - Full runs against the built-in projection engine
//!
//! `support` holds the shared scenario fixture and a synthetic evaluator
//! whose metrics are simple closed-form functions of the scenario
//! parameters, so every search has a known optimum.

mod solver_grid;
mod solver_multi;
mod support;
