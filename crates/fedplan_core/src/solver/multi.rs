//! Multi-dimensional optimization
//!
//! Runs the single-target solver for every (target, goal) pair over the
//! fixed target set {TSP rate, retirement date, SS claim age}, swallowing
//! individual failures, then reduces the surviving results to three
//! best-by-metric winners and templated recommendation text. The overall
//! call fails only when zero pairs succeed. Pairs run strictly
//! sequentially; cancellation aborts between pairs and inside each search.

use serde::{Deserialize, Serialize};

use crate::config::PlanConfig;
use crate::error::SolverError;
use crate::evaluate::{ScenarioEvaluator, SolveProgress};
use crate::model::Scenario;

use super::{
    Constraints, OptimalValue, OptimizationGoal, OptimizationRequest, OptimizationResult,
    OptimizationTarget, optimize,
};

const TARGETS: [OptimizationTarget; 3] = [
    OptimizationTarget::TspRate,
    OptimizationTarget::RetirementDate,
    OptimizationTarget::SsClaimAge,
];

/// Request for a full multi-dimensional run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiDimensionalRequest {
    pub scenario: Scenario,
    pub config: PlanConfig,
    pub goals: Vec<OptimizationGoal>,
    pub constraints: Constraints,
    pub max_iterations: usize,
    pub tolerance: f64,
}

/// All successful per-target results plus best-by-metric winners
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiDimensionalResult {
    pub results: Vec<OptimizationResult>,

    /// Indices into `results`; `None` only when `results` is empty in that
    /// metric (cannot happen for income/taxes since every result carries
    /// metrics)
    best_by_income: Option<usize>,
    best_by_longevity: Option<usize>,
    best_by_taxes: Option<usize>,

    pub recommendations: Vec<String>,
}

impl MultiDimensionalResult {
    #[must_use]
    pub fn best_by_income(&self) -> Option<&OptimizationResult> {
        self.best_by_income.map(|i| &self.results[i])
    }

    #[must_use]
    pub fn best_by_longevity(&self) -> Option<&OptimizationResult> {
        self.best_by_longevity.map(|i| &self.results[i])
    }

    #[must_use]
    pub fn best_by_taxes(&self) -> Option<&OptimizationResult> {
        self.best_by_taxes.map(|i| &self.results[i])
    }
}

/// Run every target × goal pair and reduce to a ranked summary.
pub fn optimize_all<E: ScenarioEvaluator>(
    evaluator: &E,
    progress: &SolveProgress,
    request: &MultiDimensionalRequest,
) -> Result<MultiDimensionalResult, SolverError> {
    request.constraints.validate()?;

    let mut results = Vec::new();

    for target in TARGETS {
        for goal in &request.goals {
            if progress.is_cancelled() {
                return Err(SolverError::Cancelled);
            }

            let single = OptimizationRequest {
                scenario: request.scenario.deep_copy(),
                config: request.config.clone(),
                target,
                goal: *goal,
                constraints: request.constraints.clone(),
                max_iterations: request.max_iterations,
                tolerance: request.tolerance,
            };

            match optimize(evaluator, progress, &single) {
                Ok(result) if result.success => results.push(result),
                Ok(result) => {
                    tracing::warn!(
                        target = target.as_str(),
                        goal = goal.as_str(),
                        note = %result.convergence_note,
                        "skipping non-convergent pair"
                    );
                }
                Err(SolverError::Cancelled) => return Err(SolverError::Cancelled),
                Err(e) => {
                    tracing::warn!(
                        target = target.as_str(),
                        goal = goal.as_str(),
                        error = %e,
                        "skipping failed pair"
                    );
                }
            }
        }
    }

    if results.is_empty() {
        return Err(SolverError::AllPairsFailed {
            goals: request.goals.clone(),
        });
    }

    let best_by_income = reduce(&results, |a, b| {
        a.metrics.lifetime_income > b.metrics.lifetime_income
    });
    let best_by_longevity = reduce(&results, |a, b| {
        a.metrics.tsp_longevity_years > b.metrics.tsp_longevity_years
    });
    let best_by_taxes = reduce(&results, |a, b| {
        a.metrics.lifetime_taxes < b.metrics.lifetime_taxes
    });

    let recommendations = generate_recommendations(
        &results,
        best_by_income,
        best_by_longevity,
        best_by_taxes,
    );

    Ok(MultiDimensionalResult {
        results,
        best_by_income,
        best_by_longevity,
        best_by_taxes,
        recommendations,
    })
}

/// First-found-wins reduction: only a strictly better candidate replaces
/// the current best.
fn reduce(
    results: &[OptimizationResult],
    strictly_better: impl Fn(&OptimizationResult, &OptimizationResult) -> bool,
) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, candidate) in results.iter().enumerate() {
        match best {
            Some(b) if !strictly_better(candidate, &results[b]) => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Render the winning parameter value as an actionable phrase.
fn describe_optimal(result: &OptimizationResult) -> String {
    match result.optimal {
        OptimalValue::RetirementDate { date } => format!("retire on {date}"),
        OptimalValue::TspRate { rate } => {
            format!("withdraw {:.2}% of TSP annually", rate * 100.0)
        }
        OptimalValue::TspBalance { balance } => {
            format!("target a TSP balance of ${balance:.0}")
        }
        OptimalValue::SsClaimAge { age } => {
            format!("claim Social Security at age {age}")
        }
    }
}

fn generate_recommendations(
    results: &[OptimizationResult],
    best_by_income: Option<usize>,
    best_by_longevity: Option<usize>,
    best_by_taxes: Option<usize>,
) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(i) = best_by_income {
        let r = &results[i];
        lines.push(format!(
            "To maximize lifetime income, {} (${:.0} over the plan horizon).",
            describe_optimal(r),
            r.metrics.lifetime_income
        ));
    }

    if let Some(i) = best_by_longevity {
        let r = &results[i];
        lines.push(format!(
            "To keep TSP assets the longest, {} ({} years of TSP longevity).",
            describe_optimal(r),
            r.metrics.tsp_longevity_years
        ));
    }

    if let Some(i) = best_by_taxes {
        let r = &results[i];
        lines.push(format!(
            "To minimize lifetime taxes, {} (${:.0} total tax).",
            describe_optimal(r),
            r.metrics.lifetime_taxes
        ));
    }

    if let (Some(i), Some(j)) = (best_by_income, best_by_longevity)
        && results[i].target == results[j].target
    {
        lines.push(format!(
            "Income and longevity agree: adjusting {} improves both.",
            results[i].target.as_str()
        ));
    }

    lines
}
