//! Projection output types
//!
//! `ProjectionSummary` is the evaluation contract the solver consumes: it
//! never inspects the engine that produced it, only these derived figures
//! and the year-by-year tax fields.

use serde::{Deserialize, Serialize};

/// One projected calendar year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearProjection {
    pub year: i16,
    pub gross_income: f64,
    pub net_income: f64,
    pub federal_tax: f64,
    pub state_tax: f64,
    pub local_tax: f64,
    pub fica_tax: f64,
    /// Combined traditional + Roth TSP balance at year end
    pub tsp_balance: f64,
}

impl YearProjection {
    #[must_use]
    pub fn total_tax(&self) -> f64 {
        self.federal_tax + self.state_tax + self.local_tax + self.fica_tax
    }
}

/// Summary of a full year-by-year projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    /// Net household income in the first projected year
    pub first_year_net_income: f64,

    /// Present-valued sum of net income over the projection
    pub lifetime_income: f64,

    /// Years until the combined TSP balance is exhausted
    /// (projection length if it never is)
    pub tsp_longevity_years: u32,

    /// Combined TSP balance at the end of the projection
    pub final_tsp_balance: f64,

    pub years: Vec<YearProjection>,
}

impl ProjectionSummary {
    /// Total federal + state + local + FICA tax across every projected year.
    ///
    /// A pure reduction over the year rows; never re-derived from rates.
    #[must_use]
    pub fn lifetime_taxes(&self) -> f64 {
        self.years.iter().map(YearProjection::total_tax).sum()
    }
}
