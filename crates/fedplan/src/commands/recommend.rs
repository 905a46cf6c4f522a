//! `recommend`: multi-dimensional run over every goal-seeking objective

use std::path::Path;

use fedplan_core::evaluate::SolveProgress;
use fedplan_core::projection::ProjectionEngine;
use fedplan_core::solver::{Constraints, MultiDimensionalRequest, OptimizationGoal, optimize_all};

use crate::{input, output};

pub fn run(plan_path: &Path, participant: &str, json: bool) -> color_eyre::Result<()> {
    let plan = input::load_plan(plan_path)?;

    // match_income is excluded: it needs a target income, which this
    // command doesn't take
    let request = MultiDimensionalRequest {
        scenario: plan.scenario,
        config: plan.config,
        goals: vec![
            OptimizationGoal::MaximizeIncome,
            OptimizationGoal::MaximizeLongevity,
            OptimizationGoal::MinimizeTaxes,
        ],
        constraints: Constraints::new(participant),
        max_iterations: 50,
        tolerance: 1_000.0,
    };

    let result = optimize_all(&ProjectionEngine, &SolveProgress::new(), &request)?;

    if json {
        output::emit_json(&result)
    } else {
        print!("{}", output::recommendation_report(&result));
        Ok(())
    }
}
