//! Multi-dimensional runs: every target x goal pair plus the reduction

use crate::config::PlanConfig;
use crate::error::SolverError;
use crate::evaluate::SolveProgress;
use crate::solver::{
    Constraints, MultiDimensionalRequest, OptimalValue, OptimizationGoal, optimize_all,
};

use super::support::{FailingEvaluator, SyntheticEvaluator, base_scenario};

fn multi_request() -> MultiDimensionalRequest {
    MultiDimensionalRequest {
        scenario: base_scenario(),
        config: PlanConfig::default(),
        goals: vec![
            OptimizationGoal::MaximizeIncome,
            OptimizationGoal::MaximizeLongevity,
            OptimizationGoal::MinimizeTaxes,
        ],
        constraints: Constraints::new("alice"),
        max_iterations: 50,
        tolerance: 1_000.0,
    }
}

#[test]
fn test_all_pairs_run_and_reduce() {
    let result = optimize_all(&SyntheticEvaluator, &SolveProgress::new(), &multi_request())
        .unwrap();

    // 3 targets x 3 goals, every pair succeeds on the synthetic metrics
    assert_eq!(result.results.len(), 9);
    assert!(result.results.iter().all(|r| r.success));

    // Rate has the strongest income lever (10x multiplier vs $1k/month)
    let best_income = result.best_by_income().unwrap();
    assert_eq!(best_income.optimal, OptimalValue::TspRate { rate: 0.15 });

    // Longevity equals the claim age, so the age grid wins at 70
    let best_longevity = result.best_by_longevity().unwrap();
    assert_eq!(best_longevity.optimal, OptimalValue::SsClaimAge { age: 70 });

    // Taxes scale with the rate, so the lowest swept rate wins
    let best_taxes = result.best_by_taxes().unwrap();
    assert_eq!(best_taxes.optimal, OptimalValue::TspRate { rate: 0.01 });
}

#[test]
fn test_recommendations_cover_each_metric() {
    let result = optimize_all(&SyntheticEvaluator, &SolveProgress::new(), &multi_request())
        .unwrap();

    // Income and longevity winners disagree on target, so no bonus line
    assert_eq!(result.recommendations.len(), 3);
    assert!(result.recommendations[0].contains("lifetime income"));
    assert!(result.recommendations[1].contains("longest"));
    assert!(result.recommendations[2].contains("taxes"));
}

#[test]
fn test_all_failures_surface_as_one_error() {
    let err = optimize_all(&FailingEvaluator, &SolveProgress::new(), &multi_request())
        .unwrap_err();
    assert!(matches!(err, SolverError::AllPairsFailed { .. }));
}

#[test]
fn test_cancellation_propagates() {
    let progress = SolveProgress::new();
    progress.cancel();
    let err = optimize_all(&SyntheticEvaluator, &progress, &multi_request()).unwrap_err();
    assert!(matches!(err, SolverError::Cancelled));
}

#[test]
fn test_invalid_constraints_fail_before_any_pair() {
    let mut request = multi_request();
    request.constraints.min_ss_age = Some(70);
    request.constraints.max_ss_age = Some(62);

    let progress = SolveProgress::new();
    let err = optimize_all(&SyntheticEvaluator, &progress, &request).unwrap_err();
    assert!(matches!(err, SolverError::InvalidConstraints(_)));
    assert_eq!(progress.completed(), 0);
}
