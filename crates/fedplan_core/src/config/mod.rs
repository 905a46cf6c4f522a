//! Projection configuration
//!
//! `PlanConfig` holds the world assumptions shared by every candidate the
//! solver evaluates: projection horizon, growth and COLA assumptions, and
//! effective tax rates. It is passed by reference alongside each scenario
//! and never modified by the solver.

use serde::{Deserialize, Serialize};

fn default_projection_years() -> usize {
    40
}

fn default_cola() -> f64 {
    0.02
}

fn default_tsp_growth() -> f64 {
    0.05
}

fn default_discount() -> f64 {
    0.02
}

/// Complete projection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    /// How many years to project
    #[serde(default = "default_projection_years")]
    pub projection_years: usize,

    /// First projected calendar year. Defaults to the earliest retirement
    /// year in the scenario; pin it when two projections must cover the
    /// same calendar span.
    #[serde(default)]
    pub start_year: Option<i16>,

    /// Annual cost-of-living adjustment applied to pension and SS benefits
    #[serde(default = "default_cola")]
    pub annual_cola: f64,

    /// Nominal annual growth applied to TSP balances
    #[serde(default = "default_tsp_growth")]
    pub tsp_growth_rate: f64,

    /// Discount rate used to present-value lifetime income
    #[serde(default = "default_discount")]
    pub discount_rate: f64,

    #[serde(default)]
    pub taxes: EffectiveTaxRates,

    /// Accepted for forward compatibility; evaluation currently runs
    /// strictly sequentially regardless of this flag.
    #[serde(default)]
    pub parallel_evaluation: bool,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            projection_years: default_projection_years(),
            start_year: None,
            annual_cola: default_cola(),
            tsp_growth_rate: default_tsp_growth(),
            discount_rate: default_discount(),
            taxes: EffectiveTaxRates::default(),
            parallel_evaluation: false,
        }
    }
}

/// Effective (flat) tax rates applied to projected ordinary income.
///
/// A deliberate simplification of the real bracket structure; the solver
/// only ever consumes the resulting per-year tax fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveTaxRates {
    #[serde(default = "EffectiveTaxRates::default_federal")]
    pub federal: f64,
    #[serde(default = "EffectiveTaxRates::default_state")]
    pub state: f64,
    #[serde(default = "EffectiveTaxRates::default_local")]
    pub local: f64,
    #[serde(default = "EffectiveTaxRates::default_fica")]
    pub fica: f64,
}

impl EffectiveTaxRates {
    fn default_federal() -> f64 {
        0.15
    }

    fn default_state() -> f64 {
        0.05
    }

    fn default_local() -> f64 {
        0.01
    }

    fn default_fica() -> f64 {
        0.0765
    }
}

impl Default for EffectiveTaxRates {
    fn default() -> Self {
        Self {
            federal: Self::default_federal(),
            state: Self::default_state(),
            local: Self::default_local(),
            fica: Self::default_fica(),
        }
    }
}
