//! `break-even`: first year the transformed plan's cumulative net income
//! overtakes the base plan's

use std::path::Path;

use fedplan_core::evaluate::{ScenarioEvaluator, SolveProgress};
use fedplan_core::projection::ProjectionEngine;
use fedplan_core::transform::apply_transforms;
use fedplan_core::{PlanConfig, ProjectionSummary, Scenario};

use crate::{input, output};

pub fn run(plan_path: &Path, specs: &[String], json: bool) -> color_eyre::Result<()> {
    let plan = input::load_plan(plan_path)?;
    let transforms = input::build_transforms(specs)?;
    let transformed = apply_transforms(&plan.scenario, &transforms)?;

    let (base_summary, new_summary) = project_aligned(&plan.config, &plan.scenario, &transformed)?;
    let year = break_even_year(&base_summary, &new_summary);

    if json {
        output::emit_json(&serde_json::json!({ "break_even_year": year }))
    } else {
        match year {
            Some(year) => println!("break-even in {year}"),
            None => println!("no break-even within the projection horizon"),
        }
        Ok(())
    }
}

/// Project both scenarios over the same calendar span.
///
/// The engine starts each projection at that scenario's earliest retirement
/// year, so a postponed scenario's series would otherwise be shifted and its
/// extra working years absent. Pinning both to the earlier start keeps the
/// series comparable year for year.
fn project_aligned(
    config: &PlanConfig,
    base: &Scenario,
    transformed: &Scenario,
) -> color_eyre::Result<(ProjectionSummary, ProjectionSummary)> {
    let shared_start = [base, transformed]
        .into_iter()
        .flat_map(|s| s.participants.values())
        .filter_map(|p| p.retirement_date)
        .map(|d| d.year())
        .min();

    let config = PlanConfig {
        start_year: config.start_year.or(shared_start),
        ..config.clone()
    };

    let engine = ProjectionEngine;
    let progress = SolveProgress::new();
    let base_summary = engine.evaluate(&progress, &config, base)?;
    let new_summary = engine.evaluate(&progress, &config, transformed)?;
    Ok((base_summary, new_summary))
}

/// First calendar year in which the transformed projection's cumulative net
/// income exceeds the base's. Rows are joined on `YearProjection::year`, so
/// series starting in different years are still compared calendar year
/// against calendar year.
fn break_even_year(base: &ProjectionSummary, transformed: &ProjectionSummary) -> Option<i16> {
    let mut transformed_rows = transformed.years.iter().peekable();
    let mut base_cumulative = 0.0;
    let mut transformed_cumulative = 0.0;

    for b in &base.years {
        while let Some(t) = transformed_rows.peek()
            && t.year <= b.year
        {
            transformed_cumulative += t.net_income;
            transformed_rows.next();
        }
        base_cumulative += b.net_income;
        if transformed_cumulative > base_cumulative {
            return Some(b.year);
        }
    }
    None
}
