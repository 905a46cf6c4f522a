//! `compare`: ordered transform application plus side-by-side projections

use std::path::Path;

use fedplan_core::evaluate::{ScenarioEvaluator, SolveProgress};
use fedplan_core::projection::ProjectionEngine;
use fedplan_core::transform::apply_transforms;

use crate::{input, output};

pub fn run(plan_path: &Path, specs: &[String], json: bool) -> color_eyre::Result<()> {
    let plan = input::load_plan(plan_path)?;
    let transforms = input::build_transforms(specs)?;

    let transformed = apply_transforms(&plan.scenario, &transforms)?;

    let engine = ProjectionEngine;
    let progress = SolveProgress::new();
    let base_summary = engine.evaluate(&progress, &plan.config, &plan.scenario)?;
    let new_summary = engine.evaluate(&progress, &plan.config, &transformed)?;

    for transform in &transforms {
        tracing::info!(transform = %transform.description(), "applied");
    }

    if json {
        output::emit_json(&serde_json::json!({
            "base": base_summary,
            "transformed": new_summary,
        }))
    } else {
        print!(
            "{}",
            output::comparison("base", &base_summary, "transformed", &new_summary)
        );
        Ok(())
    }
}
