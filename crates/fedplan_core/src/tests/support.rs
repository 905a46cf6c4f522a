//! Shared fixtures for the solver integration tests

use std::collections::BTreeMap;

use jiff::civil::date;

use crate::config::PlanConfig;
use crate::error::EvaluateError;
use crate::evaluate::{ScenarioEvaluator, SolveProgress};
use crate::model::{
    ParticipantScenario, ProjectionSummary, Scenario, TspPlan, TspTransferMode,
    WithdrawalStrategy, YearProjection,
};
use crate::solver::{Constraints, OptimizationGoal, OptimizationRequest, OptimizationTarget};

/// One-participant scenario: retires 2032-06-30 with a $700k TSP at a 4%
/// variable rate, claiming SS at 62.
pub fn base_scenario() -> Scenario {
    let mut participants = BTreeMap::new();
    participants.insert(
        "alice".to_string(),
        ParticipantScenario {
            birth_date: date(1970, 3, 15),
            high3_salary: 110_000.0,
            service_years: 30.0,
            retirement_date: Some(date(2032, 6, 30)),
            ss_start_age: 62,
            tsp: TspPlan {
                traditional_balance: 600_000.0,
                roth_balance: 100_000.0,
                strategy: WithdrawalStrategy::VariablePercentage,
                withdrawal_rate: Some(0.04),
                monthly_target: None,
                transfer_mode: TspTransferMode::KeepInTsp,
            },
            mortality: None,
            roth_conversions: Vec::new(),
        },
    );
    Scenario {
        name: "base".to_string(),
        description: String::new(),
        participants,
    }
}

pub fn request(
    target: OptimizationTarget,
    goal: OptimizationGoal,
    constraints: Constraints,
) -> OptimizationRequest {
    OptimizationRequest {
        scenario: base_scenario(),
        config: PlanConfig::default(),
        target,
        goal,
        constraints,
        max_iterations: 50,
        tolerance: 1_000.0,
    }
}

/// Evaluator with closed-form metrics over the first participant:
///
/// - first-year net income = withdrawal rate x TSP balance (monotonic, so
///   bisection has an exact preimage for any reachable target)
/// - lifetime income = 10x first-year income + $1k per calendar month of
///   the retirement date (later dates and higher rates both help)
/// - TSP longevity = the SS claim age (maximized at 70)
/// - lifetime taxes = rate x $100k (minimized at the lowest rate)
pub struct SyntheticEvaluator;

impl ScenarioEvaluator for SyntheticEvaluator {
    fn evaluate(
        &self,
        _progress: &SolveProgress,
        _config: &PlanConfig,
        scenario: &Scenario,
    ) -> Result<ProjectionSummary, EvaluateError> {
        let plan = scenario
            .participants
            .values()
            .next()
            .ok_or_else(|| EvaluateError::InvalidScenario("no participants".to_string()))?;
        let retirement = plan.retirement_date.ok_or_else(|| {
            EvaluateError::InvalidScenario("no retirement date".to_string())
        })?;

        let rate = plan.tsp.withdrawal_rate.unwrap_or(0.04);
        let balance = plan.tsp.total_balance();
        let month_index = f64::from(retirement.year()) * 12.0 + f64::from(retirement.month());

        let first_year = rate * balance;
        Ok(ProjectionSummary {
            first_year_net_income: first_year,
            lifetime_income: first_year * 10.0 + month_index * 1_000.0,
            tsp_longevity_years: u32::from(plan.ss_start_age),
            final_tsp_balance: balance,
            years: vec![YearProjection {
                year: retirement.year(),
                gross_income: first_year,
                net_income: first_year,
                federal_tax: rate * 100_000.0,
                state_tax: 0.0,
                local_tax: 0.0,
                fica_tax: 0.0,
                tsp_balance: balance,
            }],
        })
    }
}

/// Evaluator that fails every candidate.
pub struct FailingEvaluator;

impl ScenarioEvaluator for FailingEvaluator {
    fn evaluate(
        &self,
        _progress: &SolveProgress,
        _config: &PlanConfig,
        _scenario: &Scenario,
    ) -> Result<ProjectionSummary, EvaluateError> {
        Err(EvaluateError::InvalidScenario(
            "synthetic failure".to_string(),
        ))
    }
}
