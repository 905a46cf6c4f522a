//! Subcommand implementations

pub mod break_even;
pub mod compare;
pub mod optimize;
pub mod recommend;

use fedplan_core::solver::{OptimizationGoal, OptimizationTarget};

pub fn parse_target(s: &str) -> Result<OptimizationTarget, String> {
    match s {
        "tsp_rate" => Ok(OptimizationTarget::TspRate),
        "retirement_date" => Ok(OptimizationTarget::RetirementDate),
        "ss_age" => Ok(OptimizationTarget::SsClaimAge),
        "tsp_balance" => Ok(OptimizationTarget::TspBalance),
        "all" => Ok(OptimizationTarget::All),
        other => Err(format!(
            "unknown target {other:?} (expected tsp_rate, retirement_date, ss_age, tsp_balance, or all)"
        )),
    }
}

pub fn parse_goal(s: &str) -> Result<OptimizationGoal, String> {
    match s {
        "match_income" => Ok(OptimizationGoal::MatchIncome),
        "maximize_income" => Ok(OptimizationGoal::MaximizeIncome),
        "maximize_longevity" => Ok(OptimizationGoal::MaximizeLongevity),
        "minimize_taxes" => Ok(OptimizationGoal::MinimizeTaxes),
        other => Err(format!(
            "unknown goal {other:?} (expected match_income, maximize_income, maximize_longevity, or minimize_taxes)"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_roundtrips_as_str() {
        for name in ["tsp_rate", "retirement_date", "ss_age", "tsp_balance", "all"] {
            assert_eq!(parse_target(name).unwrap().as_str(), name);
        }
        assert!(parse_target("pension").is_err());
    }

    #[test]
    fn test_parse_goal_roundtrips_as_str() {
        for name in [
            "match_income",
            "maximize_income",
            "maximize_longevity",
            "minimize_taxes",
        ] {
            assert_eq!(parse_goal(name).unwrap().as_str(), name);
        }
        assert!(parse_goal("maximize_fun").is_err());
    }
}
