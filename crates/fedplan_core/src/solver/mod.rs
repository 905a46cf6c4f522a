//! Goal-seeking solver over planning scenarios
//!
//! Given a target parameter, a goal, and constraints, the solver repeatedly
//! builds a candidate scenario through the transform pipeline, evaluates it
//! through the external calculation engine, and narrows toward an optimum
//! with a target-specific search strategy:
//! - TSP withdrawal rate (continuous): binary search under `MatchIncome`,
//!   fixed-step sweep for the other goals
//! - SS claim age (discrete ordinal): exhaustive integer grid over [62, 70]
//! - retirement date (discrete calendar): one-month grid around the base date
//!
//! The `TspBalance` target is a known gap and surfaces a stable
//! `NotImplemented` error instead of a silent default.

mod grid_search;
mod multi;
mod rate_search;

pub use multi::{MultiDimensionalRequest, MultiDimensionalResult, optimize_all};

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::config::PlanConfig;
use crate::error::{EvaluateError, SolverError};
use crate::evaluate::{ScenarioEvaluator, SolveProgress};
use crate::model::{ProjectionSummary, Scenario};
use crate::transform::{MAX_SS_CLAIM_AGE, MAX_TSP_RATE, MIN_SS_CLAIM_AGE};

/// The parameter being searched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationTarget {
    TspRate,
    RetirementDate,
    SsClaimAge,
    TspBalance,
    All,
}

impl OptimizationTarget {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OptimizationTarget::TspRate => "tsp_rate",
            OptimizationTarget::RetirementDate => "retirement_date",
            OptimizationTarget::SsClaimAge => "ss_age",
            OptimizationTarget::TspBalance => "tsp_balance",
            OptimizationTarget::All => "all",
        }
    }
}

/// The optimization objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationGoal {
    /// Converge first-year net income to `Constraints::target_income`
    MatchIncome,
    /// Maximize present-valued lifetime income
    MaximizeIncome,
    /// Maximize years until the TSP is exhausted
    MaximizeLongevity,
    /// Minimize total lifetime taxes
    MinimizeTaxes,
}

impl OptimizationGoal {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OptimizationGoal::MatchIncome => "match_income",
            OptimizationGoal::MaximizeIncome => "maximize_income",
            OptimizationGoal::MaximizeLongevity => "maximize_longevity",
            OptimizationGoal::MinimizeTaxes => "minimize_taxes",
        }
    }
}

/// Per-optimization bounds, validated once before any iteration runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Participant whose parameters are being searched; required
    pub participant: String,

    #[serde(default)]
    pub min_retirement_date: Option<Date>,
    #[serde(default)]
    pub max_retirement_date: Option<Date>,

    #[serde(default)]
    pub min_tsp_rate: Option<f64>,
    #[serde(default)]
    pub max_tsp_rate: Option<f64>,

    #[serde(default)]
    pub min_tsp_balance: Option<f64>,
    #[serde(default)]
    pub max_tsp_balance: Option<f64>,

    /// Hard domain bound [62, 70] applies on top of these
    #[serde(default)]
    pub min_ss_age: Option<u8>,
    #[serde(default)]
    pub max_ss_age: Option<u8>,

    /// Annual net income goal for `MatchIncome`
    #[serde(default)]
    pub target_income: Option<f64>,
}

impl Constraints {
    #[must_use]
    pub fn new(participant: impl Into<String>) -> Self {
        Self {
            participant: participant.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn target_income(mut self, income: f64) -> Self {
        self.target_income = Some(income);
        self
    }

    /// Check bound ordering and domain limits. Always fatal to the call
    /// when it fails; nothing is evaluated after a constraint error.
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.participant.is_empty() {
            return Err(SolverError::InvalidConstraints(
                "participant must not be empty".to_string(),
            ));
        }

        if let (Some(min), Some(max)) = (self.min_retirement_date, self.max_retirement_date)
            && min > max
        {
            return Err(SolverError::InvalidConstraints(format!(
                "min retirement date {min} after max {max}"
            )));
        }

        if let (Some(min), Some(max)) = (self.min_tsp_rate, self.max_tsp_rate)
            && min > max
        {
            return Err(SolverError::InvalidConstraints(format!(
                "min TSP rate {min} above max {max}"
            )));
        }
        for rate in [self.min_tsp_rate, self.max_tsp_rate].into_iter().flatten() {
            if !(rate > 0.0 && rate <= MAX_TSP_RATE) {
                return Err(SolverError::InvalidConstraints(format!(
                    "TSP rate bound {rate} outside (0, {MAX_TSP_RATE}]"
                )));
            }
        }

        if let (Some(min), Some(max)) = (self.min_tsp_balance, self.max_tsp_balance)
            && min > max
        {
            return Err(SolverError::InvalidConstraints(format!(
                "min TSP balance {min} above max {max}"
            )));
        }

        if let (Some(min), Some(max)) = (self.min_ss_age, self.max_ss_age)
            && min > max
        {
            return Err(SolverError::InvalidConstraints(format!(
                "min SS age {min} above max {max}"
            )));
        }
        for age in [self.min_ss_age, self.max_ss_age].into_iter().flatten() {
            if !(MIN_SS_CLAIM_AGE..=MAX_SS_CLAIM_AGE).contains(&age) {
                return Err(SolverError::InvalidConstraints(format!(
                    "SS age bound {age} outside [{MIN_SS_CLAIM_AGE}, {MAX_SS_CLAIM_AGE}]"
                )));
            }
        }

        Ok(())
    }
}

fn default_max_iterations() -> usize {
    50
}

fn default_tolerance() -> f64 {
    1_000.0
}

/// Complete request for a single-target optimization run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub scenario: Scenario,
    pub config: PlanConfig,
    pub target: OptimizationTarget,
    pub goal: OptimizationGoal,
    pub constraints: Constraints,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Convergence tolerance in currency units (`MatchIncome` only)
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

/// Derived outcome metrics for one evaluated candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeMetrics {
    pub first_year_net_income: f64,
    pub lifetime_income: f64,
    pub tsp_longevity_years: u32,
    pub lifetime_taxes: f64,
}

impl From<&ProjectionSummary> for OutcomeMetrics {
    fn from(summary: &ProjectionSummary) -> Self {
        Self {
            first_year_net_income: summary.first_year_net_income,
            lifetime_income: summary.lifetime_income,
            tsp_longevity_years: summary.tsp_longevity_years,
            lifetime_taxes: summary.lifetime_taxes(),
        }
    }
}

/// Differences between an optimized candidate and the base scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDeltas {
    pub first_year_net_income: f64,
    pub lifetime_income: f64,
    pub tsp_longevity_years: i64,
    pub lifetime_taxes: f64,
}

/// The winning parameter value, matching the request's target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimalValue {
    RetirementDate { date: Date },
    TspRate { rate: f64 },
    TspBalance { balance: f64 },
    SsClaimAge { age: u8 },
}

/// Final result from an optimization run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub target: OptimizationTarget,
    pub goal: OptimizationGoal,

    /// Whether the run converged / found a usable optimum
    pub success: bool,

    /// Number of candidate evaluations performed
    pub iterations: usize,

    /// Human-readable convergence note
    pub convergence_note: String,

    pub optimal: OptimalValue,
    pub metrics: OutcomeMetrics,

    /// Deltas versus a base-scenario summary, when one was supplied
    #[serde(default)]
    pub deltas: Option<OutcomeDeltas>,
}

impl OptimizationResult {
    /// Attach deltas computed against a base-scenario summary.
    #[must_use]
    pub fn with_deltas(mut self, base: &ProjectionSummary) -> Self {
        self.deltas = Some(OutcomeDeltas {
            first_year_net_income: self.metrics.first_year_net_income
                - base.first_year_net_income,
            lifetime_income: self.metrics.lifetime_income - base.lifetime_income,
            tsp_longevity_years: i64::from(self.metrics.tsp_longevity_years)
                - i64::from(base.tsp_longevity_years),
            lifetime_taxes: self.metrics.lifetime_taxes - base.lifetime_taxes(),
        });
        self
    }
}

/// Strict "is candidate `a` better than incumbent `b`" comparison.
///
/// Ties keep the incumbent, so the earlier-found candidate wins. For
/// `MatchIncome` the comparison is distance of first-year income from
/// `target` (required by the caller before invoking).
#[must_use]
pub fn is_better(
    a: &OutcomeMetrics,
    b: &OutcomeMetrics,
    goal: OptimizationGoal,
    target_income: Option<f64>,
) -> bool {
    match goal {
        OptimizationGoal::MaximizeIncome => a.lifetime_income > b.lifetime_income,
        OptimizationGoal::MaximizeLongevity => a.tsp_longevity_years > b.tsp_longevity_years,
        OptimizationGoal::MinimizeTaxes => a.lifetime_taxes < b.lifetime_taxes,
        OptimizationGoal::MatchIncome => {
            let target = target_income.unwrap_or(0.0);
            (a.first_year_net_income - target).abs() < (b.first_year_net_income - target).abs()
        }
    }
}

/// Run a single-target optimization.
///
/// Constraints are validated up front; cancellation is checked before every
/// evaluation.
pub fn optimize<E: ScenarioEvaluator>(
    evaluator: &E,
    progress: &SolveProgress,
    request: &OptimizationRequest,
) -> Result<OptimizationResult, SolverError> {
    request.constraints.validate()?;

    if request
        .scenario
        .participant(&request.constraints.participant)
        .is_none()
    {
        return Err(SolverError::InvalidConstraints(format!(
            "participant {:?} not found in scenario",
            request.constraints.participant
        )));
    }

    if request.goal == OptimizationGoal::MatchIncome
        && request.constraints.target_income.is_none()
    {
        return Err(SolverError::InvalidConstraints(
            "match_income requires a target income".to_string(),
        ));
    }

    match request.target {
        OptimizationTarget::TspRate => rate_search::optimize_tsp_rate(evaluator, progress, request),
        OptimizationTarget::SsClaimAge => {
            grid_search::optimize_ss_age(evaluator, progress, request)
        }
        OptimizationTarget::RetirementDate => {
            grid_search::optimize_retirement_date(evaluator, progress, request)
        }
        OptimizationTarget::TspBalance => Err(SolverError::NotImplemented {
            target: OptimizationTarget::TspBalance,
        }),
        OptimizationTarget::All => Err(SolverError::InvalidRequest(
            "target 'all' is served by optimize_all, not the single-target solver".to_string(),
        )),
    }
}

/// Cancellation-aware evaluation used by every search strategy.
///
/// Checks the cancellation flag immediately before the (expensive)
/// evaluation call and maps evaluator-side cancellation to the solver's
/// error family.
fn checked_evaluate<E: ScenarioEvaluator>(
    evaluator: &E,
    progress: &SolveProgress,
    operation: &'static str,
    config: &PlanConfig,
    scenario: &Scenario,
) -> Result<ProjectionSummary, SolverError> {
    if progress.is_cancelled() {
        return Err(SolverError::Cancelled);
    }
    let summary = evaluator
        .evaluate(progress, config, scenario)
        .map_err(|e| match e {
            EvaluateError::Cancelled => SolverError::Cancelled,
            other => SolverError::Evaluation {
                operation,
                source: other,
            },
        })?;
    progress.increment();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraints_empty_participant_rejected() {
        let constraints = Constraints::default();
        assert!(matches!(
            constraints.validate(),
            Err(SolverError::InvalidConstraints(_))
        ));
    }

    #[test]
    fn test_constraints_min_above_max_rejected() {
        let constraints = Constraints {
            min_ss_age: Some(70),
            max_ss_age: Some(62),
            ..Constraints::new("Alice")
        };
        assert!(constraints.validate().is_err());

        let constraints = Constraints {
            min_tsp_rate: Some(0.10),
            max_tsp_rate: Some(0.02),
            ..Constraints::new("Alice")
        };
        assert!(constraints.validate().is_err());
    }

    #[test]
    fn test_constraints_ss_age_domain_bound() {
        let constraints = Constraints {
            min_ss_age: Some(60),
            ..Constraints::new("Alice")
        };
        assert!(constraints.validate().is_err());

        let constraints = Constraints {
            max_ss_age: Some(72),
            ..Constraints::new("Alice")
        };
        assert!(constraints.validate().is_err());
    }

    #[test]
    fn test_constraints_valid_bounds_accepted() {
        let constraints = Constraints {
            min_ss_age: Some(63),
            max_ss_age: Some(69),
            min_tsp_rate: Some(0.02),
            max_tsp_rate: Some(0.10),
            ..Constraints::new("Alice")
        };
        assert!(constraints.validate().is_ok());
    }

    fn metrics(income: f64, lifetime: f64, longevity: u32, taxes: f64) -> OutcomeMetrics {
        OutcomeMetrics {
            first_year_net_income: income,
            lifetime_income: lifetime,
            tsp_longevity_years: longevity,
            lifetime_taxes: taxes,
        }
    }

    #[test]
    fn test_is_better_per_goal() {
        let a = metrics(90_000.0, 3_200_000.0, 28, 410_000.0);
        let b = metrics(95_000.0, 3_000_000.0, 30, 400_000.0);

        assert!(is_better(&a, &b, OptimizationGoal::MaximizeIncome, None));
        assert!(!is_better(&a, &b, OptimizationGoal::MaximizeLongevity, None));
        assert!(!is_better(&a, &b, OptimizationGoal::MinimizeTaxes, None));
        assert!(is_better(
            &a,
            &b,
            OptimizationGoal::MatchIncome,
            Some(89_000.0)
        ));
    }

    #[test]
    fn test_is_better_ties_keep_incumbent() {
        let a = metrics(90_000.0, 3_000_000.0, 28, 400_000.0);
        let b = a;
        assert!(!is_better(&a, &b, OptimizationGoal::MaximizeIncome, None));
        assert!(!is_better(&a, &b, OptimizationGoal::MaximizeLongevity, None));
        assert!(!is_better(&a, &b, OptimizationGoal::MinimizeTaxes, None));
        assert!(!is_better(
            &a,
            &b,
            OptimizationGoal::MatchIncome,
            Some(91_000.0)
        ));
    }
}
