//! Planning scenario types
//!
//! A `Scenario` is the value the transform pipeline operates on: a named
//! collection of participants, each carrying the retirement parameters the
//! solver searches over. Scenarios are never mutated in place — every
//! transform deep-copies first and returns an independent instance.
//!
//! All fields are owned (`String`, `Vec`, `BTreeMap`), so `Clone` is already
//! a full structural copy; `deep_copy` exists to make that contract explicit
//! at call sites that depend on it.

use std::collections::BTreeMap;
use std::str::FromStr;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// A complete planning scenario keyed by participant name.
///
/// Participant iteration order is the sorted key order, which keeps
/// projections deterministic across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub participants: BTreeMap<String, ParticipantScenario>,
}

impl Scenario {
    /// Full structural copy. Mutating the copy never affects the original.
    #[must_use]
    pub fn deep_copy(&self) -> Scenario {
        self.clone()
    }

    #[must_use]
    pub fn participant(&self, name: &str) -> Option<&ParticipantScenario> {
        self.participants.get(name)
    }

    pub fn participant_mut(&mut self, name: &str) -> Option<&mut ParticipantScenario> {
        self.participants.get_mut(name)
    }
}

/// Per-participant retirement parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantScenario {
    pub birth_date: Date,

    /// High-3 average salary used for the FERS pension formula
    pub high3_salary: f64,

    /// Years of creditable federal service at retirement
    pub service_years: f64,

    /// Planned separation date; absent until the scenario sets one
    #[serde(default)]
    pub retirement_date: Option<Date>,

    /// Social Security claim age, domain [62, 70]
    pub ss_start_age: u8,

    pub tsp: TspPlan,

    #[serde(default)]
    pub mortality: Option<MortalityAssumptions>,

    #[serde(default)]
    pub roth_conversions: Vec<RothConversion>,
}

impl ParticipantScenario {
    /// Find the Roth conversion scheduled for a given calendar year.
    #[must_use]
    pub fn roth_conversion(&self, year: i16) -> Option<&RothConversion> {
        self.roth_conversions.iter().find(|c| c.year == year)
    }
}

/// TSP balances and withdrawal settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TspPlan {
    #[serde(default)]
    pub traditional_balance: f64,
    #[serde(default)]
    pub roth_balance: f64,

    pub strategy: WithdrawalStrategy,

    /// Annual withdrawal rate; only meaningful for rate-based strategies
    #[serde(default)]
    pub withdrawal_rate: Option<f64>,

    /// Monthly income target; only meaningful for the need-based strategy
    #[serde(default)]
    pub monthly_target: Option<f64>,

    #[serde(default)]
    pub transfer_mode: TspTransferMode,
}

impl TspPlan {
    #[must_use]
    pub fn total_balance(&self) -> f64 {
        self.traditional_balance + self.roth_balance
    }
}

/// TSP withdrawal strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStrategy {
    /// Withdraw a fixed percentage of the current balance each year
    VariablePercentage,
    /// 4% of the starting balance, inflation-adjusted thereafter
    #[serde(rename = "4_percent_rule")]
    FourPercentRule,
    /// Withdraw whatever tops income up to a monthly target
    NeedBased,
    /// Withdraw only the required minimum distribution
    RmdOnly,
}

impl WithdrawalStrategy {
    /// Strategies whose withdrawal is driven by `withdrawal_rate`
    #[must_use]
    pub fn is_rate_based(self) -> bool {
        matches!(
            self,
            WithdrawalStrategy::VariablePercentage | WithdrawalStrategy::FourPercentRule
        )
    }

    #[must_use]
    pub fn is_need_based(self) -> bool {
        self == WithdrawalStrategy::NeedBased
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WithdrawalStrategy::VariablePercentage => "variable_percentage",
            WithdrawalStrategy::FourPercentRule => "4_percent_rule",
            WithdrawalStrategy::NeedBased => "need_based",
            WithdrawalStrategy::RmdOnly => "rmd_only",
        }
    }
}

impl FromStr for WithdrawalStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "variable_percentage" => Ok(WithdrawalStrategy::VariablePercentage),
            "4_percent_rule" => Ok(WithdrawalStrategy::FourPercentRule),
            "need_based" => Ok(WithdrawalStrategy::NeedBased),
            "rmd_only" => Ok(WithdrawalStrategy::RmdOnly),
            other => Err(format!("unknown withdrawal strategy {other:?}")),
        }
    }
}

/// What happens to the TSP balance at separation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TspTransferMode {
    /// Leave balances in the TSP
    #[default]
    KeepInTsp,
    /// Roll the full balance into an IRA at separation
    TransferToIra,
    /// Roll the traditional balance over, keep Roth in the TSP
    SplitTransfer,
}

impl FromStr for TspTransferMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep_in_tsp" => Ok(TspTransferMode::KeepInTsp),
            "transfer_to_ira" => Ok(TspTransferMode::TransferToIra),
            "split_transfer" => Ok(TspTransferMode::SplitTransfer),
            other => Err(format!("unknown transfer mode {other:?}")),
        }
    }
}

/// Mortality overrides for survivor modeling
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MortalityAssumptions {
    #[serde(default)]
    pub death_date: Option<Date>,

    /// Fraction of the deceased's pension that continues to the survivor,
    /// domain (0, 1]
    #[serde(default)]
    pub survivor_spending_factor: Option<f64>,
}

/// One scheduled Roth conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RothConversion {
    pub year: i16,
    pub amount: f64,
    pub source: ConversionSource,
}

/// Which pre-tax account funds a Roth conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionSource {
    TraditionalTsp,
    TraditionalIra,
}

impl FromStr for ConversionSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "traditional_tsp" => Ok(ConversionSource::TraditionalTsp),
            "traditional_ira" => Ok(ConversionSource::TraditionalIra),
            other => Err(format!("unknown conversion source {other:?}")),
        }
    }
}
