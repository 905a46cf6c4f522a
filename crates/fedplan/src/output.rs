//! Text rendering for command output
//!
//! Rendering is pure string building so it can be tested without capturing
//! stdout; commands print the result. `--json` bypasses all of this and
//! serializes the underlying values.

use fedplan_core::ProjectionSummary;
use fedplan_core::solver::{MultiDimensionalResult, OptimalValue, OptimizationResult};

pub fn emit_json<T: serde::Serialize>(value: &T) -> color_eyre::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn money(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.0}", -amount)
    } else {
        format!("${amount:.0}")
    }
}

/// Side-by-side summary of two projections.
pub fn comparison(
    base_label: &str,
    base: &ProjectionSummary,
    other_label: &str,
    other: &ProjectionSummary,
) -> String {
    let rows = [
        (
            "first-year net income",
            money(base.first_year_net_income),
            money(other.first_year_net_income),
            money(other.first_year_net_income - base.first_year_net_income),
        ),
        (
            "lifetime income",
            money(base.lifetime_income),
            money(other.lifetime_income),
            money(other.lifetime_income - base.lifetime_income),
        ),
        (
            "lifetime taxes",
            money(base.lifetime_taxes()),
            money(other.lifetime_taxes()),
            money(other.lifetime_taxes() - base.lifetime_taxes()),
        ),
        (
            "TSP longevity",
            format!("{} years", base.tsp_longevity_years),
            format!("{} years", other.tsp_longevity_years),
            format!(
                "{:+} years",
                i64::from(other.tsp_longevity_years) - i64::from(base.tsp_longevity_years)
            ),
        ),
        (
            "final TSP balance",
            money(base.final_tsp_balance),
            money(other.final_tsp_balance),
            money(other.final_tsp_balance - base.final_tsp_balance),
        ),
    ];

    let mut out = format!("{:<24}{base_label:>16}{other_label:>16}{:>16}\n", "", "delta");
    for (label, a, b, delta) in rows {
        out.push_str(&format!("{label:<24}{a:>16}{b:>16}{delta:>16}\n"));
    }
    out
}

pub fn optimal_value(value: &OptimalValue) -> String {
    match value {
        OptimalValue::RetirementDate { date } => format!("retirement date {date}"),
        OptimalValue::TspRate { rate } => format!("TSP withdrawal rate {:.2}%", rate * 100.0),
        OptimalValue::TspBalance { balance } => format!("TSP balance {}", money(*balance)),
        OptimalValue::SsClaimAge { age } => format!("SS claim age {age}"),
    }
}

pub fn optimization(result: &OptimizationResult) -> String {
    let mut out = format!(
        "target: {}  goal: {}\n",
        result.target.as_str(),
        result.goal.as_str()
    );
    out.push_str(&format!(
        "status: {} ({} evaluations; {})\n",
        if result.success { "converged" } else { "not converged" },
        result.iterations,
        result.convergence_note
    ));
    out.push_str(&format!("optimal: {}\n", optimal_value(&result.optimal)));
    out.push_str(&format!(
        "first-year net income: {}\nlifetime income: {}\nTSP longevity: {} years\nlifetime taxes: {}\n",
        money(result.metrics.first_year_net_income),
        money(result.metrics.lifetime_income),
        result.metrics.tsp_longevity_years,
        money(result.metrics.lifetime_taxes),
    ));
    if let Some(deltas) = &result.deltas {
        out.push_str(&format!(
            "vs base: income {}, longevity {:+} years, taxes {}\n",
            money(deltas.first_year_net_income),
            deltas.tsp_longevity_years,
            money(deltas.lifetime_taxes),
        ));
    }
    out
}

pub fn recommendation_report(result: &MultiDimensionalResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} of the target/goal pairs produced a usable optimum\n\n",
        result.results.len()
    ));
    for line in &result.recommendations {
        out.push_str(&format!("- {line}\n"));
    }
    out
}
