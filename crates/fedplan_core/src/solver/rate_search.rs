//! TSP withdrawal rate search
//!
//! The rate is the one continuous target. Under `MatchIncome` there is a
//! numeric value to converge toward, so bisection applies: first-year net
//! income is monotonic in the rate, and the interval shrinks on the side
//! consistent with the sign of the income deficit. The maximize/minimize
//! goals have no target value, and income-vs-rate need not be monotonic for
//! them, so they use a fixed-step sweep of the interval instead of
//! bisection (see DESIGN.md).

use crate::error::SolverError;
use crate::evaluate::{ScenarioEvaluator, SolveProgress};
use crate::model::{Scenario, WithdrawalStrategy};
use crate::transform::{ScenarioTransform, apply_transforms};

use super::{
    OptimalValue, OptimizationGoal, OptimizationRequest, OptimizationResult, OutcomeMetrics,
    checked_evaluate, is_better,
};

/// Default search interval when constraints don't narrow it
const DEFAULT_MIN_RATE: f64 = 0.01;
const DEFAULT_MAX_RATE: f64 = 0.15;

/// Interval width below which bisection stops (rate units)
const MIN_RATE_INTERVAL: f64 = 0.0001;

/// Number of sweep points for the goal-seeking (non-match) goals
const SWEEP_POINTS: usize = 29;

pub(super) fn optimize_tsp_rate<E: ScenarioEvaluator>(
    evaluator: &E,
    progress: &SolveProgress,
    request: &OptimizationRequest,
) -> Result<OptimizationResult, SolverError> {
    let min_rate = request.constraints.min_tsp_rate.unwrap_or(DEFAULT_MIN_RATE);
    let max_rate = request.constraints.max_tsp_rate.unwrap_or(DEFAULT_MAX_RATE);

    match request.goal {
        OptimizationGoal::MatchIncome => {
            bisect_to_target(evaluator, progress, request, min_rate, max_rate)
        }
        _ => sweep_interval(evaluator, progress, request, min_rate, max_rate),
    }
}

/// Candidate scenario for a rate: force a rate-based strategy, then set the
/// rate — a two-step transform chain so the rate adjustment always
/// validates.
fn candidate_scenario(
    request: &OptimizationRequest,
    rate: f64,
) -> Result<Scenario, SolverError> {
    let participant = request.constraints.participant.clone();
    let transforms = [
        ScenarioTransform::ModifyTspStrategy {
            participant: participant.clone(),
            strategy: WithdrawalStrategy::VariablePercentage,
            preserve_settings: false,
        },
        ScenarioTransform::AdjustTspRate { participant, rate },
    ];
    Ok(apply_transforms(&request.scenario, &transforms)?)
}

fn bisect_to_target<E: ScenarioEvaluator>(
    evaluator: &E,
    progress: &SolveProgress,
    request: &OptimizationRequest,
    min_rate: f64,
    max_rate: f64,
) -> Result<OptimizationResult, SolverError> {
    const OP: &str = "tsp_rate.bisect";

    // Checked by optimize() before dispatch
    let target = request
        .constraints
        .target_income
        .ok_or_else(|| SolverError::InvalidConstraints("target income required".to_string()))?;

    progress.add_total(request.max_iterations);

    let mut low = min_rate;
    let mut high = max_rate;
    let mut best: Option<(f64, OutcomeMetrics)> = None;
    let mut iterations = 0;
    let mut interval_collapsed = false;

    while iterations < request.max_iterations {
        iterations += 1;

        let mid = f64::midpoint(low, high);
        let scenario = candidate_scenario(request, mid)?;
        // Evaluation failures are fatal here: without a summary there is no
        // way to pick a bisection direction.
        let summary = checked_evaluate(evaluator, progress, OP, &request.config, &scenario)?;
        let metrics = OutcomeMetrics::from(&summary);

        let diff = metrics.first_year_net_income - target;
        let closer = match &best {
            Some((_, incumbent)) => {
                is_better(&metrics, incumbent, OptimizationGoal::MatchIncome, Some(target))
            }
            None => true,
        };
        if closer {
            best = Some((mid, metrics));
        }

        if diff.abs() < request.tolerance {
            return Ok(OptimizationResult {
                target: request.target,
                goal: request.goal,
                success: true,
                iterations,
                convergence_note: format!(
                    "converged: first-year income within ${:.0} of target after {iterations} iterations",
                    diff.abs()
                ),
                optimal: OptimalValue::TspRate { rate: mid },
                metrics,
                deltas: None,
            });
        }

        // Deficit (income below target) raises the floor: a higher rate is
        // needed. Surplus lowers the ceiling.
        if diff < 0.0 {
            low = mid;
        } else {
            high = mid;
        }

        // Checked after the evaluation, so a pinned interval
        // (min rate == max rate) still gets its one candidate evaluated.
        if (high - low) < MIN_RATE_INTERVAL {
            interval_collapsed = true;
            break;
        }
    }

    match best {
        Some((rate, metrics)) if interval_collapsed => Ok(OptimizationResult {
            target: request.target,
            goal: request.goal,
            success: true,
            iterations,
            convergence_note: format!(
                "converged: interval narrowed below {MIN_RATE_INTERVAL}; closest income ${:.0} from target",
                (metrics.first_year_net_income - target).abs()
            ),
            optimal: OptimalValue::TspRate { rate },
            metrics,
            deltas: None,
        }),
        Some((rate, metrics)) => Ok(OptimizationResult {
            target: request.target,
            goal: request.goal,
            success: false,
            iterations,
            convergence_note: format!(
                "max iterations reached ({iterations}); best income ${:.0} from target",
                (metrics.first_year_net_income - target).abs()
            ),
            optimal: OptimalValue::TspRate { rate },
            metrics,
            deltas: None,
        }),
        None => Err(SolverError::NoCandidates {
            operation: OP,
            message: format!("no rate evaluated in [{min_rate}, {max_rate}]"),
        }),
    }
}

/// Fixed-step sweep for goals without a numeric target. Per-candidate
/// evaluation failures are skipped like any grid search; only total
/// exhaustion is fatal.
fn sweep_interval<E: ScenarioEvaluator>(
    evaluator: &E,
    progress: &SolveProgress,
    request: &OptimizationRequest,
    min_rate: f64,
    max_rate: f64,
) -> Result<OptimizationResult, SolverError> {
    const OP: &str = "tsp_rate.sweep";

    let points = request.max_iterations.clamp(2, SWEEP_POINTS);
    let step = (max_rate - min_rate) / (points - 1) as f64;
    progress.add_total(points);

    let mut best: Option<(f64, OutcomeMetrics)> = None;
    let mut evaluated = 0;
    let mut attempted = 0;

    for i in 0..points {
        if progress.is_cancelled() {
            return Err(SolverError::Cancelled);
        }
        attempted += 1;
        let rate = min_rate + step * i as f64;

        let scenario = candidate_scenario(request, rate)?;
        let summary = match checked_evaluate(evaluator, progress, OP, &request.config, &scenario) {
            Ok(summary) => summary,
            Err(SolverError::Cancelled) => return Err(SolverError::Cancelled),
            Err(e) => {
                tracing::warn!(rate, error = %e, "skipping rate candidate");
                continue;
            }
        };
        evaluated += 1;
        let metrics = OutcomeMetrics::from(&summary);

        let replace = match &best {
            Some((_, incumbent)) => is_better(&metrics, incumbent, request.goal, None),
            None => true,
        };
        if replace {
            best = Some((rate, metrics));
        }
    }

    match best {
        Some((rate, metrics)) => Ok(OptimizationResult {
            target: request.target,
            goal: request.goal,
            success: true,
            iterations: attempted,
            convergence_note: format!(
                "swept {evaluated} of {attempted} rate candidates in [{min_rate:.4}, {max_rate:.4}]"
            ),
            optimal: OptimalValue::TspRate { rate },
            metrics,
            deltas: None,
        }),
        None => Err(SolverError::NoCandidates {
            operation: OP,
            message: format!("all {attempted} rate candidates failed to evaluate"),
        }),
    }
}
