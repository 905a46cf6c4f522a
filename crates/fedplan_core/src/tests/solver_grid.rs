//! Grid searches over SS claim age and retirement date

use jiff::civil::date;

use crate::error::SolverError;
use crate::evaluate::SolveProgress;
use crate::solver::{
    Constraints, OptimalValue, OptimizationGoal, OptimizationTarget, optimize,
};

use super::support::{SyntheticEvaluator, request};

#[test]
fn test_ss_grid_covers_every_claim_age() {
    // longevity = claim age, so maximize_longevity must land on 70 after
    // walking the full [62, 70] domain
    let req = request(
        OptimizationTarget::SsClaimAge,
        OptimizationGoal::MaximizeLongevity,
        Constraints::new("alice"),
    );
    let progress = SolveProgress::new();
    let result = optimize(&SyntheticEvaluator, &progress, &req).unwrap();

    assert!(result.success);
    assert_eq!(result.iterations, 9);
    assert_eq!(progress.completed(), 9);
    assert_eq!(progress.total(), 9);
    assert!(result.convergence_note.contains("9 of 9"));
    assert_eq!(result.optimal, OptimalValue::SsClaimAge { age: 70 });
    assert_eq!(result.metrics.tsp_longevity_years, 70);
}

#[test]
fn test_ss_grid_respects_age_constraints() {
    let req = request(
        OptimizationTarget::SsClaimAge,
        OptimizationGoal::MaximizeLongevity,
        Constraints {
            min_ss_age: Some(64),
            max_ss_age: Some(66),
            ..Constraints::new("alice")
        },
    );
    let result = optimize(&SyntheticEvaluator, &SolveProgress::new(), &req).unwrap();

    assert_eq!(result.iterations, 3);
    assert_eq!(result.optimal, OptimalValue::SsClaimAge { age: 66 });
}

#[test]
fn test_ss_grid_ties_keep_earliest_age() {
    // longevity is the only age-sensitive metric; under maximize_income
    // every age scores the same and the first candidate stays
    let req = request(
        OptimizationTarget::SsClaimAge,
        OptimizationGoal::MaximizeIncome,
        Constraints::new("alice"),
    );
    let result = optimize(&SyntheticEvaluator, &SolveProgress::new(), &req).unwrap();
    assert_eq!(result.optimal, OptimalValue::SsClaimAge { age: 62 });
}

#[test]
fn test_date_grid_default_window_picks_latest_date() {
    // lifetime income grows $1k per month of postponement, so the window
    // ceiling (base + 36 months) wins; the window spans -24..=+36
    let req = request(
        OptimizationTarget::RetirementDate,
        OptimizationGoal::MaximizeIncome,
        Constraints::new("alice"),
    );
    let result = optimize(&SyntheticEvaluator, &SolveProgress::new(), &req).unwrap();

    assert!(result.success);
    assert_eq!(result.iterations, 61);
    assert_eq!(
        result.optimal,
        OptimalValue::RetirementDate {
            date: date(2035, 6, 30)
        }
    );
}

#[test]
fn test_date_grid_respects_date_constraints() {
    let req = request(
        OptimizationTarget::RetirementDate,
        OptimizationGoal::MaximizeIncome,
        Constraints {
            min_retirement_date: Some(date(2032, 1, 30)),
            max_retirement_date: Some(date(2032, 12, 30)),
            ..Constraints::new("alice")
        },
    );
    let result = optimize(&SyntheticEvaluator, &SolveProgress::new(), &req).unwrap();

    assert_eq!(result.iterations, 12);
    assert_eq!(
        result.optimal,
        OptimalValue::RetirementDate {
            date: date(2032, 12, 30)
        }
    );
}

#[test]
fn test_date_grid_drops_candidates_outside_constraint_days() {
    // The base day of month is 30; a min constraint on the 31st makes the
    // first monthly candidate (2032-01-30) fall before the bound, and a max
    // on the 15th puts the last candidate (2032-12-30) past it. Both must
    // be dropped rather than evaluated.
    let req = request(
        OptimizationTarget::RetirementDate,
        OptimizationGoal::MaximizeIncome,
        Constraints {
            min_retirement_date: Some(date(2032, 1, 31)),
            max_retirement_date: Some(date(2032, 12, 15)),
            ..Constraints::new("alice")
        },
    );
    let result = optimize(&SyntheticEvaluator, &SolveProgress::new(), &req).unwrap();

    // Offsets -5..=6 span 12 months; the two edge candidates are excluded
    assert_eq!(result.iterations, 10);
    assert_eq!(
        result.optimal,
        OptimalValue::RetirementDate {
            date: date(2032, 11, 30)
        }
    );
}

#[test]
fn test_date_grid_requires_a_base_retirement_date() {
    let mut req = request(
        OptimizationTarget::RetirementDate,
        OptimizationGoal::MaximizeIncome,
        Constraints::new("alice"),
    );
    req.scenario
        .participant_mut("alice")
        .unwrap()
        .retirement_date = None;

    let err = optimize(&SyntheticEvaluator, &SolveProgress::new(), &req).unwrap_err();
    assert!(matches!(err, SolverError::InvalidConstraints(_)));
}

#[test]
fn test_tsp_balance_target_not_implemented() {
    let req = request(
        OptimizationTarget::TspBalance,
        OptimizationGoal::MaximizeIncome,
        Constraints::new("alice"),
    );
    let err = optimize(&SyntheticEvaluator, &SolveProgress::new(), &req).unwrap_err();
    assert!(matches!(
        err,
        SolverError::NotImplemented {
            target: OptimizationTarget::TspBalance
        }
    ));
}

#[test]
fn test_cancelled_progress_aborts_search() {
    let req = request(
        OptimizationTarget::SsClaimAge,
        OptimizationGoal::MaximizeLongevity,
        Constraints::new("alice"),
    );
    let progress = SolveProgress::new();
    progress.cancel();

    let err = optimize(&SyntheticEvaluator, &progress, &req).unwrap_err();
    assert!(matches!(err, SolverError::Cancelled));
    assert_eq!(progress.completed(), 0);
}
