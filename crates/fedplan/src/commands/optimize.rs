//! `optimize`: single-target search, or the full grid when the target is
//! `all`

use std::path::Path;

use fedplan_core::evaluate::{ScenarioEvaluator, SolveProgress};
use fedplan_core::projection::ProjectionEngine;
use fedplan_core::solver::{
    Constraints, MultiDimensionalRequest, OptimizationGoal, OptimizationRequest,
    OptimizationTarget, optimize, optimize_all,
};

use crate::{input, output};

pub struct OptimizeArgs {
    pub participant: String,
    pub target: OptimizationTarget,
    pub goal: OptimizationGoal,
    pub target_income: Option<f64>,
    pub max_iterations: usize,
    pub tolerance: f64,
}

pub fn run(plan_path: &Path, args: &OptimizeArgs, json: bool) -> color_eyre::Result<()> {
    let plan = input::load_plan(plan_path)?;

    let mut constraints = Constraints::new(args.participant.clone());
    constraints.target_income = args.target_income;

    // `all` fans out to the multi-dimensional solver with the one goal
    if args.target == OptimizationTarget::All {
        let request = MultiDimensionalRequest {
            scenario: plan.scenario,
            config: plan.config,
            goals: vec![args.goal],
            constraints,
            max_iterations: args.max_iterations,
            tolerance: args.tolerance,
        };
        let result = optimize_all(&ProjectionEngine, &SolveProgress::new(), &request)?;
        return if json {
            output::emit_json(&result)
        } else {
            print!("{}", output::recommendation_report(&result));
            Ok(())
        };
    }

    let engine = ProjectionEngine;
    let progress = SolveProgress::new();
    let base_summary = engine.evaluate(&progress, &plan.config, &plan.scenario)?;

    let request = OptimizationRequest {
        scenario: plan.scenario,
        config: plan.config,
        target: args.target,
        goal: args.goal,
        constraints,
        max_iterations: args.max_iterations,
        tolerance: args.tolerance,
    };

    let result = optimize(&engine, &progress, &request)?.with_deltas(&base_summary);

    if json {
        output::emit_json(&result)
    } else {
        print!("{}", output::optimization(&result));
        Ok(())
    }
}
