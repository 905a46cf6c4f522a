//! Grid searches for the discrete targets
//!
//! SS claim age is an integer grid over the clamped [62, 70] domain;
//! retirement date is a one-month grid around the participant's current
//! retirement date. Both evaluate every grid point, skip candidates whose
//! evaluation fails (logging the skip), and keep the best-by-goal candidate
//! with strict first-wins tie semantics. A grid search succeeds as long as
//! at least one point evaluated.

use jiff::civil::Date;

use crate::date_math::{add_months, months_between};
use crate::error::SolverError;
use crate::evaluate::{ScenarioEvaluator, SolveProgress};
use crate::model::Scenario;
use crate::transform::{
    MAX_SS_CLAIM_AGE, MIN_SS_CLAIM_AGE, ScenarioTransform, apply_transforms,
};

use super::{
    OptimalValue, OptimizationRequest, OptimizationResult, OutcomeMetrics, checked_evaluate,
    is_better,
};

/// Default retirement-date window around the base date, in months
const DEFAULT_WINDOW_BEFORE: i32 = -24;
const DEFAULT_WINDOW_AFTER: i32 = 36;

pub(super) fn optimize_ss_age<E: ScenarioEvaluator>(
    evaluator: &E,
    progress: &SolveProgress,
    request: &OptimizationRequest,
) -> Result<OptimizationResult, SolverError> {
    const OP: &str = "ss_age.grid";

    let min_age = request
        .constraints
        .min_ss_age
        .unwrap_or(MIN_SS_CLAIM_AGE)
        .max(MIN_SS_CLAIM_AGE);
    let max_age = request
        .constraints
        .max_ss_age
        .unwrap_or(MAX_SS_CLAIM_AGE)
        .min(MAX_SS_CLAIM_AGE);

    if max_age >= min_age {
        progress.add_total((max_age - min_age) as usize + 1);
    }

    let target_income = request.constraints.target_income;
    let mut best: Option<(u8, OutcomeMetrics)> = None;
    let mut evaluated = 0;
    let mut attempted = 0;

    for age in min_age..=max_age {
        if progress.is_cancelled() {
            return Err(SolverError::Cancelled);
        }
        attempted += 1;

        let transform = ScenarioTransform::DelaySsClaim {
            participant: request.constraints.participant.clone(),
            age,
        };
        let scenario = apply_transforms(&request.scenario, std::slice::from_ref(&transform))?;

        let summary = match checked_evaluate(evaluator, progress, OP, &request.config, &scenario) {
            Ok(summary) => summary,
            Err(SolverError::Cancelled) => return Err(SolverError::Cancelled),
            Err(e) => {
                tracing::warn!(age, error = %e, "skipping claim age");
                continue;
            }
        };
        evaluated += 1;
        let metrics = OutcomeMetrics::from(&summary);

        let replace = match &best {
            Some((_, incumbent)) => is_better(&metrics, incumbent, request.goal, target_income),
            None => true,
        };
        if replace {
            best = Some((age, metrics));
        }
    }

    match best {
        Some((age, metrics)) => Ok(OptimizationResult {
            target: request.target,
            goal: request.goal,
            success: true,
            iterations: attempted,
            convergence_note: format!(
                "evaluated {evaluated} of {attempted} claim ages in [{min_age}, {max_age}]"
            ),
            optimal: OptimalValue::SsClaimAge { age },
            metrics,
            deltas: None,
        }),
        None => Err(SolverError::NoCandidates {
            operation: OP,
            message: format!("all {attempted} claim ages failed to evaluate"),
        }),
    }
}

pub(super) fn optimize_retirement_date<E: ScenarioEvaluator>(
    evaluator: &E,
    progress: &SolveProgress,
    request: &OptimizationRequest,
) -> Result<OptimizationResult, SolverError> {
    const OP: &str = "retirement_date.grid";

    // Participant existence is checked by optimize() before dispatch
    let participant = &request.constraints.participant;
    let base_date = request
        .scenario
        .participant(participant)
        .and_then(|p| p.retirement_date)
        .ok_or_else(|| {
            SolverError::InvalidConstraints(format!(
                "participant {participant:?} has no retirement date to search around"
            ))
        })?;

    let start = request
        .constraints
        .min_retirement_date
        .unwrap_or_else(|| add_months(base_date, DEFAULT_WINDOW_BEFORE));
    let end = request
        .constraints
        .max_retirement_date
        .unwrap_or_else(|| add_months(base_date, DEFAULT_WINDOW_AFTER));

    let first_offset = months_between(base_date, start);
    let last_offset = months_between(base_date, end);
    if last_offset >= first_offset {
        progress.add_total((last_offset - first_offset + 1) as usize);
    }

    let target_income = request.constraints.target_income;
    let mut best: Option<(Date, OutcomeMetrics)> = None;
    let mut evaluated = 0;
    let mut attempted = 0;

    for offset in first_offset..=last_offset {
        if progress.is_cancelled() {
            return Err(SolverError::Cancelled);
        }
        let date = add_months(base_date, offset);
        // The month offsets ignore days, so a constraint date whose day
        // falls past the base day can put the edge candidates outside the
        // stated bounds. Those candidates are dropped, not clamped.
        if date < start || date > end {
            continue;
        }
        attempted += 1;

        // Offset zero is the base date itself: a clean deep copy, no
        // transform. Positive offsets postpone; negative offsets need the
        // absolute-date transform because postponement is forward-only.
        let scenario: Scenario = if offset == 0 {
            request.scenario.deep_copy()
        } else if offset > 0 {
            let transform = ScenarioTransform::PostponeRetirement {
                participant: participant.clone(),
                months: offset as u32,
            };
            apply_transforms(&request.scenario, std::slice::from_ref(&transform))?
        } else {
            let transform = ScenarioTransform::SetRetirementDate {
                participant: participant.clone(),
                date,
            };
            apply_transforms(&request.scenario, std::slice::from_ref(&transform))?
        };

        let summary = match checked_evaluate(evaluator, progress, OP, &request.config, &scenario) {
            Ok(summary) => summary,
            Err(SolverError::Cancelled) => return Err(SolverError::Cancelled),
            Err(e) => {
                tracing::warn!(%date, error = %e, "skipping retirement date");
                continue;
            }
        };
        evaluated += 1;
        let metrics = OutcomeMetrics::from(&summary);

        let replace = match &best {
            Some((_, incumbent)) => is_better(&metrics, incumbent, request.goal, target_income),
            None => true,
        };
        if replace {
            best = Some((date, metrics));
        }
    }

    match best {
        Some((date, metrics)) => Ok(OptimizationResult {
            target: request.target,
            goal: request.goal,
            success: true,
            iterations: attempted,
            convergence_note: format!(
                "evaluated {evaluated} of {attempted} monthly retirement dates in [{start}, {end}]"
            ),
            optimal: OptimalValue::RetirementDate { date },
            metrics,
            deltas: None,
        }),
        None => Err(SolverError::NoCandidates {
            operation: OP,
            message: format!("all {attempted} retirement dates failed to evaluate"),
        }),
    }
}
