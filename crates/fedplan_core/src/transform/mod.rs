//! Scenario transforms
//!
//! A transform is a pure function over a `Scenario`: validate against the
//! scenario state it would be applied to, then produce a new, independent
//! scenario. The variant set is closed and matched exhaustively, so adding
//! a transform is a compile-checked change everywhere it matters.
//!
//! Validation always runs against the scenario *at the point of
//! application*, not the original base — pipelines chain, and a strategy
//! change earlier in the chain can make a later rate adjustment legal or
//! illegal.

pub mod pipeline;
pub mod registry;

pub use pipeline::apply_transforms;
pub use registry::{TemplateRegistry, TransformParams, TransformRegistry, parse_spec};

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::date_math::add_months;
use crate::error::TransformError;
use crate::model::{
    MortalityAssumptions, ParticipantScenario, RothConversion, Scenario, TspTransferMode,
    WithdrawalStrategy,
};

/// Hard domain bounds for Social Security claim age
pub const MIN_SS_CLAIM_AGE: u8 = 62;
pub const MAX_SS_CLAIM_AGE: u8 = 70;

/// Upper bound on the annual TSP withdrawal rate
pub const MAX_TSP_RATE: f64 = 0.20;

/// Calendar-year window for Roth conversions
pub const MIN_CONVERSION_YEAR: i16 = 2020;
pub const MAX_CONVERSION_YEAR: i16 = 2100;

/// One scenario modification, applied immutably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioTransform {
    /// Push the retirement date out by a number of months
    PostponeRetirement { participant: String, months: u32 },

    /// Set the retirement date to an absolute value
    SetRetirementDate { participant: String, date: Date },

    /// Change the Social Security claim age
    DelaySsClaim { participant: String, age: u8 },

    /// Switch the TSP withdrawal strategy. Clears the rate and monthly
    /// target unless `preserve_settings` is set.
    ModifyTspStrategy {
        participant: String,
        strategy: WithdrawalStrategy,
        preserve_settings: bool,
    },

    /// Change the withdrawal rate of a rate-based strategy
    AdjustTspRate { participant: String, rate: f64 },

    /// Change the monthly income target of the need-based strategy
    SetTspTargetIncome {
        participant: String,
        monthly_amount: f64,
    },

    /// Append entries to the Roth conversion schedule
    EnableRothConversion {
        participant: String,
        conversions: Vec<RothConversion>,
    },

    /// Change the amount of an already-scheduled conversion year
    ModifyRothConversion {
        participant: String,
        year: i16,
        amount: f64,
    },

    /// Drop a scheduled conversion year
    RemoveRothConversion { participant: String, year: i16 },

    /// Set an assumed death date
    SetMortalityDate { participant: String, date: Date },

    /// Set the survivor spending factor, lazily initializing the mortality
    /// substructure
    SetSurvivorSpendingFactor { participant: String, factor: f64 },

    /// Set what happens to the TSP balance at separation
    SetTspTransferMode {
        participant: String,
        mode: TspTransferMode,
    },
}

impl ScenarioTransform {
    /// Registry key / stable name for this transform
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioTransform::PostponeRetirement { .. } => "postpone_retirement",
            ScenarioTransform::SetRetirementDate { .. } => "set_retirement_date",
            ScenarioTransform::DelaySsClaim { .. } => "delay_ss_claim",
            ScenarioTransform::ModifyTspStrategy { .. } => "modify_tsp_strategy",
            ScenarioTransform::AdjustTspRate { .. } => "adjust_tsp_rate",
            ScenarioTransform::SetTspTargetIncome { .. } => "set_tsp_target_income",
            ScenarioTransform::EnableRothConversion { .. } => "enable_roth_conversion",
            ScenarioTransform::ModifyRothConversion { .. } => "modify_roth_conversion",
            ScenarioTransform::RemoveRothConversion { .. } => "remove_roth_conversion",
            ScenarioTransform::SetMortalityDate { .. } => "set_mortality_date",
            ScenarioTransform::SetSurvivorSpendingFactor { .. } => "set_survivor_spending_factor",
            ScenarioTransform::SetTspTransferMode { .. } => "set_tsp_transfer_mode",
        }
    }

    /// Human-readable description of what this transform does
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            ScenarioTransform::PostponeRetirement {
                participant,
                months,
            } => format!("postpone {participant}'s retirement by {months} months"),
            ScenarioTransform::SetRetirementDate { participant, date } => {
                format!("set {participant}'s retirement date to {date}")
            }
            ScenarioTransform::DelaySsClaim { participant, age } => {
                format!("claim Social Security for {participant} at age {age}")
            }
            ScenarioTransform::ModifyTspStrategy {
                participant,
                strategy,
                ..
            } => format!(
                "switch {participant}'s TSP strategy to {}",
                strategy.as_str()
            ),
            ScenarioTransform::AdjustTspRate { participant, rate } => {
                format!(
                    "set {participant}'s TSP withdrawal rate to {:.2}%",
                    rate * 100.0
                )
            }
            ScenarioTransform::SetTspTargetIncome {
                participant,
                monthly_amount,
            } => format!(
                "set {participant}'s TSP target income to ${monthly_amount:.0}/month"
            ),
            ScenarioTransform::EnableRothConversion {
                participant,
                conversions,
            } => format!(
                "schedule {} Roth conversion(s) for {participant}",
                conversions.len()
            ),
            ScenarioTransform::ModifyRothConversion {
                participant,
                year,
                amount,
            } => format!(
                "change {participant}'s {year} Roth conversion to ${amount:.0}"
            ),
            ScenarioTransform::RemoveRothConversion { participant, year } => {
                format!("remove {participant}'s {year} Roth conversion")
            }
            ScenarioTransform::SetMortalityDate { participant, date } => {
                format!("assume {participant} dies on {date}")
            }
            ScenarioTransform::SetSurvivorSpendingFactor {
                participant,
                factor,
            } => format!(
                "set {participant}'s survivor spending factor to {factor:.2}"
            ),
            ScenarioTransform::SetTspTransferMode { participant, mode } => {
                format!("set {participant}'s TSP transfer mode to {mode:?}")
            }
        }
    }

    /// The participant this transform targets
    #[must_use]
    pub fn participant(&self) -> &str {
        match self {
            ScenarioTransform::PostponeRetirement { participant, .. }
            | ScenarioTransform::SetRetirementDate { participant, .. }
            | ScenarioTransform::DelaySsClaim { participant, .. }
            | ScenarioTransform::ModifyTspStrategy { participant, .. }
            | ScenarioTransform::AdjustTspRate { participant, .. }
            | ScenarioTransform::SetTspTargetIncome { participant, .. }
            | ScenarioTransform::EnableRothConversion { participant, .. }
            | ScenarioTransform::ModifyRothConversion { participant, .. }
            | ScenarioTransform::RemoveRothConversion { participant, .. }
            | ScenarioTransform::SetMortalityDate { participant, .. }
            | ScenarioTransform::SetSurvivorSpendingFactor { participant, .. }
            | ScenarioTransform::SetTspTransferMode { participant, .. } => participant,
        }
    }

    /// Check this transform against the scenario state it would be applied to.
    pub fn validate(&self, scenario: &Scenario) -> Result<(), TransformError> {
        let participant = self.lookup(scenario)?;

        match self {
            ScenarioTransform::PostponeRetirement { .. } => {
                if participant.retirement_date.is_none() {
                    return Err(self.missing_field("retirement date"));
                }
            }
            ScenarioTransform::SetRetirementDate { .. } => {}
            ScenarioTransform::DelaySsClaim { age, .. } => {
                if !(MIN_SS_CLAIM_AGE..=MAX_SS_CLAIM_AGE).contains(age) {
                    return Err(self.invalid_parameter(format!(
                        "claim age {age} outside [{MIN_SS_CLAIM_AGE}, {MAX_SS_CLAIM_AGE}]"
                    )));
                }
            }
            ScenarioTransform::ModifyTspStrategy { .. } => {}
            ScenarioTransform::AdjustTspRate { rate, .. } => {
                if !(*rate > 0.0 && *rate <= MAX_TSP_RATE) {
                    return Err(self.invalid_parameter(format!(
                        "rate {rate} outside (0, {MAX_TSP_RATE}]"
                    )));
                }
                if !participant.tsp.strategy.is_rate_based() {
                    return Err(TransformError::IncompatibleStrategy {
                        transform: self.name(),
                        participant: self.participant().to_string(),
                        strategy: participant.tsp.strategy,
                        required: "a rate-based strategy",
                    });
                }
            }
            ScenarioTransform::SetTspTargetIncome { monthly_amount, .. } => {
                if *monthly_amount <= 0.0 {
                    return Err(self.invalid_parameter(format!(
                        "monthly amount {monthly_amount} must be positive"
                    )));
                }
                if !participant.tsp.strategy.is_need_based() {
                    return Err(TransformError::IncompatibleStrategy {
                        transform: self.name(),
                        participant: self.participant().to_string(),
                        strategy: participant.tsp.strategy,
                        required: "the need-based strategy",
                    });
                }
            }
            ScenarioTransform::EnableRothConversion { conversions, .. } => {
                if conversions.is_empty() {
                    return Err(self.invalid_parameter("empty conversion schedule".to_string()));
                }
                for c in conversions {
                    validate_conversion_entry(self, c.year, c.amount)?;
                }
            }
            ScenarioTransform::ModifyRothConversion { year, amount, .. } => {
                validate_conversion_entry(self, *year, *amount)?;
                if participant.roth_conversion(*year).is_none() {
                    return Err(self.invalid_parameter(format!(
                        "no conversion scheduled for {year}"
                    )));
                }
            }
            ScenarioTransform::RemoveRothConversion { year, .. } => {
                if participant.roth_conversion(*year).is_none() {
                    return Err(self.invalid_parameter(format!(
                        "no conversion scheduled for {year}"
                    )));
                }
            }
            ScenarioTransform::SetMortalityDate { .. } => {}
            ScenarioTransform::SetSurvivorSpendingFactor { factor, .. } => {
                if !(*factor > 0.0 && *factor <= 1.0) {
                    return Err(self.invalid_parameter(format!(
                        "survivor spending factor {factor} outside (0, 1]"
                    )));
                }
            }
            ScenarioTransform::SetTspTransferMode { .. } => {}
        }

        Ok(())
    }

    /// Produce a new scenario with this transform applied.
    ///
    /// The input is never touched; the result is a deep copy with exactly
    /// this transform's effect.
    pub fn apply(&self, scenario: &Scenario) -> Result<Scenario, TransformError> {
        let mut next = scenario.deep_copy();
        let name = self.participant().to_string();
        let p = next
            .participant_mut(&name)
            .ok_or_else(|| TransformError::ParticipantNotFound {
                transform: self.name(),
                participant: name.clone(),
            })?;

        match self {
            ScenarioTransform::PostponeRetirement { months, .. } => {
                let date = p
                    .retirement_date
                    .ok_or_else(|| self.missing_field("retirement date"))?;
                p.retirement_date = Some(add_months(date, *months as i32));
            }
            ScenarioTransform::SetRetirementDate { date, .. } => {
                p.retirement_date = Some(*date);
            }
            ScenarioTransform::DelaySsClaim { age, .. } => {
                p.ss_start_age = *age;
            }
            ScenarioTransform::ModifyTspStrategy {
                strategy,
                preserve_settings,
                ..
            } => {
                p.tsp.strategy = *strategy;
                if !preserve_settings {
                    p.tsp.withdrawal_rate = None;
                    p.tsp.monthly_target = None;
                }
            }
            ScenarioTransform::AdjustTspRate { rate, .. } => {
                p.tsp.withdrawal_rate = Some(*rate);
            }
            ScenarioTransform::SetTspTargetIncome { monthly_amount, .. } => {
                p.tsp.monthly_target = Some(*monthly_amount);
            }
            ScenarioTransform::EnableRothConversion { conversions, .. } => {
                p.roth_conversions.extend(conversions.iter().cloned());
            }
            ScenarioTransform::ModifyRothConversion { year, amount, .. } => {
                let entry = p
                    .roth_conversions
                    .iter_mut()
                    .find(|c| c.year == *year)
                    .ok_or_else(|| {
                        self.invalid_parameter(format!("no conversion scheduled for {year}"))
                    })?;
                entry.amount = *amount;
            }
            ScenarioTransform::RemoveRothConversion { year, .. } => {
                p.roth_conversions.retain(|c| c.year != *year);
            }
            ScenarioTransform::SetMortalityDate { date, .. } => {
                p.mortality
                    .get_or_insert_with(MortalityAssumptions::default)
                    .death_date = Some(*date);
            }
            ScenarioTransform::SetSurvivorSpendingFactor { factor, .. } => {
                p.mortality
                    .get_or_insert_with(MortalityAssumptions::default)
                    .survivor_spending_factor = Some(*factor);
            }
            ScenarioTransform::SetTspTransferMode { mode, .. } => {
                p.tsp.transfer_mode = *mode;
            }
        }

        Ok(next)
    }

    fn lookup<'a>(&self, scenario: &'a Scenario) -> Result<&'a ParticipantScenario, TransformError> {
        scenario
            .participant(self.participant())
            .ok_or_else(|| TransformError::ParticipantNotFound {
                transform: self.name(),
                participant: self.participant().to_string(),
            })
    }

    fn missing_field(&self, field: &'static str) -> TransformError {
        TransformError::MissingField {
            transform: self.name(),
            participant: self.participant().to_string(),
            field,
        }
    }

    fn invalid_parameter(&self, reason: String) -> TransformError {
        TransformError::InvalidParameter {
            transform: self.name(),
            reason,
        }
    }
}

fn validate_conversion_entry(
    transform: &ScenarioTransform,
    year: i16,
    amount: f64,
) -> Result<(), TransformError> {
    if amount <= 0.0 {
        return Err(transform.invalid_parameter(format!(
            "conversion amount {amount} must be positive"
        )));
    }
    if !(MIN_CONVERSION_YEAR..=MAX_CONVERSION_YEAR).contains(&year) {
        return Err(transform.invalid_parameter(format!(
            "conversion year {year} outside [{MIN_CONVERSION_YEAR}, {MAX_CONVERSION_YEAR}]"
        )));
    }
    Ok(())
}
