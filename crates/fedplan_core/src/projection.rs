//! Built-in deterministic projection engine
//!
//! A deliberately simplified year-by-year model of federal retirement
//! income: FERS pension, Social Security with claim-age adjustment, TSP
//! withdrawals per strategy, Roth conversions, and effective-rate taxes.
//! It exists so the CLI and integration tests have a real
//! `ScenarioEvaluator` — it is not the tax code, and the solver never
//! depends on anything here beyond the `ProjectionSummary` contract.
//!
//! Deterministic by construction: no randomness, no wall-clock reads.
//! First-year net income is monotonic in the TSP withdrawal rate under the
//! rate-based strategies, which is what the bisection solver relies on.

use crate::config::PlanConfig;
use crate::error::EvaluateError;
use crate::evaluate::{ScenarioEvaluator, SolveProgress};
use crate::model::{
    ConversionSource, ParticipantScenario, ProjectionSummary, Scenario, WithdrawalStrategy,
    YearProjection,
};

/// FERS multiplier: 1.1% with age 62+ and 20+ years of service, else 1.0%
const FERS_MULTIPLIER: f64 = 0.01;
const FERS_ENHANCED_MULTIPLIER: f64 = 0.011;

/// SS full retirement age and claim-age adjustment slopes
const SS_FULL_RETIREMENT_AGE: i16 = 67;
const SS_EARLY_REDUCTION_PER_YEAR: f64 = 0.0667;
const SS_DELAYED_CREDIT_PER_YEAR: f64 = 0.08;

/// Simplified SS benefit as a fraction of high-3 salary
const SS_REPLACEMENT_RATIO: f64 = 0.30;

/// RMD age and simplified uniform-table divisor floor
const RMD_START_AGE: i16 = 73;
const RMD_DIVISOR_FLOOR: f64 = 10.0;

/// Stateless evaluator over the simplified model
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionEngine;

/// Mutable per-participant projection state
struct ParticipantState<'a> {
    plan: &'a ParticipantScenario,
    traditional: f64,
    roth: f64,
    initial_balance: f64,
    retirement_year: i16,
    retirement_month: i8,
}

impl ParticipantState<'_> {
    fn age_in(&self, year: i16) -> i16 {
        year - self.plan.birth_date.year()
    }

    fn alive_in(&self, year: i16) -> bool {
        match self.plan.mortality.as_ref().and_then(|m| m.death_date) {
            Some(death) => year <= death.year(),
            None => true,
        }
    }

    fn balance(&self) -> f64 {
        self.traditional + self.roth
    }

    /// Annual TSP withdrawal for this year, before balance capping.
    fn target_withdrawal(&self, year: i16, cola: f64) -> f64 {
        match self.plan.tsp.strategy {
            WithdrawalStrategy::VariablePercentage => {
                self.plan.tsp.withdrawal_rate.unwrap_or(0.04) * self.balance()
            }
            WithdrawalStrategy::FourPercentRule => {
                let rate = self.plan.tsp.withdrawal_rate.unwrap_or(0.04);
                let years_retired = i32::from(year - self.retirement_year).max(0);
                rate * self.initial_balance * (1.0 + cola).powi(years_retired)
            }
            WithdrawalStrategy::NeedBased => {
                self.plan.tsp.monthly_target.unwrap_or(0.0) * 12.0
            }
            WithdrawalStrategy::RmdOnly => {
                let age = self.age_in(year);
                if age < RMD_START_AGE {
                    0.0
                } else {
                    let divisor = f64::from(100 - age).max(RMD_DIVISOR_FLOOR);
                    self.traditional / divisor
                }
            }
        }
    }
}

impl ScenarioEvaluator for ProjectionEngine {
    fn evaluate(
        &self,
        progress: &SolveProgress,
        config: &PlanConfig,
        scenario: &Scenario,
    ) -> Result<ProjectionSummary, EvaluateError> {
        if progress.is_cancelled() {
            return Err(EvaluateError::Cancelled);
        }
        if scenario.participants.is_empty() {
            return Err(EvaluateError::InvalidScenario(
                "scenario has no participants".to_string(),
            ));
        }
        if config.projection_years == 0 {
            return Err(EvaluateError::Config(
                "projection_years must be positive".to_string(),
            ));
        }

        let mut states = Vec::with_capacity(scenario.participants.len());
        let mut earliest_retirement = i16::MAX;
        for (name, plan) in &scenario.participants {
            let retirement = plan.retirement_date.ok_or_else(|| {
                EvaluateError::InvalidScenario(format!(
                    "participant {name:?} has no retirement date"
                ))
            })?;
            earliest_retirement = earliest_retirement.min(retirement.year());
            states.push(ParticipantState {
                plan,
                traditional: plan.tsp.traditional_balance,
                roth: plan.tsp.roth_balance,
                initial_balance: plan.tsp.total_balance(),
                retirement_year: retirement.year(),
                retirement_month: retirement.month(),
            });
        }

        let start_year = config.start_year.unwrap_or(earliest_retirement);
        let rates = config.taxes;
        let mut years = Vec::with_capacity(config.projection_years);
        let mut exhausted_at: Option<u32> = None;

        for offset in 0..config.projection_years {
            let year = start_year + offset as i16;
            let household_alive = states.iter().filter(|s| s.alive_in(year)).count();

            let mut wages = 0.0;
            let mut pension_income = 0.0;
            let mut ss_income = 0.0;
            let mut traditional_withdrawn = 0.0;
            let mut roth_withdrawn = 0.0;
            let mut conversion_income = 0.0;

            for state in &mut states {
                let alive = state.alive_in(year);
                let retired = year >= state.retirement_year;

                // Salary until separation; prorated in the separation year.
                if alive {
                    if year < state.retirement_year {
                        wages += state.plan.high3_salary;
                    } else if year == state.retirement_year {
                        wages += state.plan.high3_salary
                            * f64::from(state.retirement_month - 1)
                            / 12.0;
                    }
                }

                // FERS pension with COLA; survivor annuity after death.
                if retired {
                    let age_at_retirement =
                        state.retirement_year - state.plan.birth_date.year();
                    let multiplier = if age_at_retirement >= 62 && state.plan.service_years >= 20.0
                    {
                        FERS_ENHANCED_MULTIPLIER
                    } else {
                        FERS_MULTIPLIER
                    };
                    let years_retired = i32::from(year - state.retirement_year);
                    let mut pension = multiplier
                        * state.plan.high3_salary
                        * state.plan.service_years
                        * (1.0 + config.annual_cola).powi(years_retired);
                    if year == state.retirement_year {
                        pension *= f64::from(12 - state.retirement_month) / 12.0;
                    }
                    if alive {
                        pension_income += pension;
                    } else if household_alive > 0 {
                        let factor = state
                            .plan
                            .mortality
                            .as_ref()
                            .and_then(|m| m.survivor_spending_factor)
                            .unwrap_or(0.0);
                        pension_income += pension * factor;
                    }
                }

                // Social Security with claim-age adjustment and COLA.
                let claim_age = i16::from(state.plan.ss_start_age);
                if alive && state.age_in(year) >= claim_age {
                    let adjustment = if claim_age >= SS_FULL_RETIREMENT_AGE {
                        1.0 + SS_DELAYED_CREDIT_PER_YEAR
                            * f64::from(claim_age - SS_FULL_RETIREMENT_AGE)
                    } else {
                        1.0 - SS_EARLY_REDUCTION_PER_YEAR
                            * f64::from(SS_FULL_RETIREMENT_AGE - claim_age)
                    };
                    let years_claiming = i32::from(state.age_in(year) - claim_age);
                    ss_income += SS_REPLACEMENT_RATIO
                        * state.plan.high3_salary
                        * adjustment
                        * (1.0 + config.annual_cola).powi(years_claiming);
                }

                // Roth conversions scheduled for this calendar year.
                if alive && let Some(conversion) = state.plan.roth_conversion(year) {
                    match conversion.source {
                        ConversionSource::TraditionalTsp => {
                            let amount = conversion.amount.min(state.traditional);
                            state.traditional -= amount;
                            state.roth += amount;
                            conversion_income += amount;
                        }
                        // External IRA balances aren't tracked; the
                        // conversion still lands as taxable income.
                        ConversionSource::TraditionalIra => {
                            conversion_income += conversion.amount;
                        }
                    }
                }

                // TSP withdrawals, traditional first.
                if alive && retired {
                    let target = state.target_withdrawal(year, config.annual_cola);
                    let from_traditional = target.min(state.traditional);
                    state.traditional -= from_traditional;
                    let from_roth = (target - from_traditional).min(state.roth);
                    state.roth -= from_roth;
                    traditional_withdrawn += from_traditional;
                    roth_withdrawn += from_roth;
                }

                // Growth applies to what remains.
                state.traditional *= 1.0 + config.tsp_growth_rate;
                state.roth *= 1.0 + config.tsp_growth_rate;
            }

            let ordinary_income =
                wages + pension_income + ss_income + traditional_withdrawn + conversion_income;
            let federal_tax = ordinary_income * rates.federal;
            let state_tax = ordinary_income * rates.state;
            let local_tax = ordinary_income * rates.local;
            let fica_tax = wages * rates.fica;

            let gross_income =
                wages + pension_income + ss_income + traditional_withdrawn + roth_withdrawn;
            let net_income = gross_income - federal_tax - state_tax - local_tax - fica_tax;

            let tsp_balance: f64 = states.iter().map(ParticipantState::balance).sum();
            if exhausted_at.is_none() && tsp_balance < 1.0 {
                exhausted_at = Some(offset as u32);
            }

            years.push(YearProjection {
                year,
                gross_income,
                net_income,
                federal_tax,
                state_tax,
                local_tax,
                fica_tax,
                tsp_balance,
            });
        }

        let lifetime_income = years
            .iter()
            .enumerate()
            .map(|(i, y)| y.net_income / (1.0 + config.discount_rate).powi(i as i32))
            .sum();

        Ok(ProjectionSummary {
            first_year_net_income: years[0].net_income,
            lifetime_income,
            tsp_longevity_years: exhausted_at.unwrap_or(config.projection_years as u32),
            final_tsp_balance: years.last().map_or(0.0, |y| y.tsp_balance),
            years,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TspPlan, TspTransferMode};
    use jiff::civil::date;
    use std::collections::BTreeMap;

    fn scenario_with_rate(rate: f64) -> Scenario {
        let mut participants = BTreeMap::new();
        participants.insert(
            "Alice".to_string(),
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
                    withdrawal_rate: Some(rate),
                    monthly_target: None,
                    transfer_mode: TspTransferMode::KeepInTsp,
                },
                mortality: None,
                roth_conversions: Vec::new(),
            },
        );
        Scenario {
            name: "test".to_string(),
            description: String::new(),
            participants,
        }
    }

    #[test]
    fn test_projection_is_deterministic() {
        let engine = ProjectionEngine;
        let progress = SolveProgress::new();
        let config = PlanConfig::default();
        let scenario = scenario_with_rate(0.04);

        let a = engine.evaluate(&progress, &config, &scenario).unwrap();
        let b = engine.evaluate(&progress, &config, &scenario).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_first_year_income_monotonic_in_rate() {
        let engine = ProjectionEngine;
        let progress = SolveProgress::new();
        let config = PlanConfig::default();

        let mut last = f64::NEG_INFINITY;
        for rate in [0.02, 0.04, 0.06, 0.08, 0.10] {
            let summary = engine
                .evaluate(&progress, &config, &scenario_with_rate(rate))
                .unwrap();
            assert!(
                summary.first_year_net_income > last,
                "income not monotonic at rate {rate}"
            );
            last = summary.first_year_net_income;
        }
    }

    #[test]
    fn test_higher_rate_shortens_longevity() {
        let engine = ProjectionEngine;
        let progress = SolveProgress::new();
        let config = PlanConfig::default();

        let slow = engine
            .evaluate(&progress, &config, &scenario_with_rate(0.03))
            .unwrap();
        let fast = engine
            .evaluate(&progress, &config, &scenario_with_rate(0.15))
            .unwrap();
        assert!(fast.final_tsp_balance < slow.final_tsp_balance);
    }

    #[test]
    fn test_missing_retirement_date_rejected() {
        let engine = ProjectionEngine;
        let progress = SolveProgress::new();
        let config = PlanConfig::default();
        let mut scenario = scenario_with_rate(0.04);
        scenario.participant_mut("Alice").unwrap().retirement_date = None;

        let err = engine.evaluate(&progress, &config, &scenario).unwrap_err();
        assert!(matches!(err, EvaluateError::InvalidScenario(_)));
    }

    #[test]
    fn test_cancelled_progress_rejected() {
        let engine = ProjectionEngine;
        let progress = SolveProgress::new();
        progress.cancel();
        let config = PlanConfig::default();

        let err = engine
            .evaluate(&progress, &config, &scenario_with_rate(0.04))
            .unwrap_err();
        assert!(matches!(err, EvaluateError::Cancelled));
    }

    #[test]
    fn test_pinned_start_year_covers_working_years() {
        let engine = ProjectionEngine;
        let progress = SolveProgress::new();
        let config = PlanConfig {
            start_year: Some(2030),
            ..PlanConfig::default()
        };

        let summary = engine
            .evaluate(&progress, &config, &scenario_with_rate(0.04))
            .unwrap();

        // Two full working years precede the mid-2032 separation
        assert_eq!(summary.years[0].year, 2030);
        assert!(summary.years[0].fica_tax > summary.years[2].fica_tax);
        assert_eq!(summary.years[3].fica_tax, 0.0);
    }

    #[test]
    fn test_fica_applies_only_to_wage_year() {
        let engine = ProjectionEngine;
        let progress = SolveProgress::new();
        let config = PlanConfig::default();
        let summary = engine
            .evaluate(&progress, &config, &scenario_with_rate(0.04))
            .unwrap();

        // Separation mid-2032: partial wages in year one, none afterwards.
        assert!(summary.years[0].fica_tax > 0.0);
        assert_eq!(summary.years[1].fica_tax, 0.0);
    }
}
