//! Plan file loading
//!
//! A plan file is a YAML document with a `scenario` and an optional
//! `config` section; missing config fields fall back to the defaults.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{WrapErr, eyre};
use serde::Deserialize;

use fedplan_core::transform::{ScenarioTransform, TransformRegistry};
use fedplan_core::{PlanConfig, Scenario};

#[derive(Debug, Deserialize)]
pub struct PlanFile {
    pub scenario: Scenario,

    #[serde(default)]
    pub config: PlanConfig,
}

pub fn load_plan(path: &Path) -> color_eyre::Result<PlanFile> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("reading plan file {}", path.display()))?;
    serde_saphyr::from_str(&text)
        .map_err(|e| eyre!("parsing plan file {}: {e}", path.display()))
}

/// Build the transform chain from `--transform` spec strings, in order.
pub fn build_transforms(specs: &[String]) -> color_eyre::Result<Vec<ScenarioTransform>> {
    let registry = TransformRegistry::with_defaults();
    specs
        .iter()
        .map(|spec| {
            registry
                .from_spec(spec)
                .map_err(|e| eyre!("transform {spec:?}: {e}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PLAN_YAML: &str = "\
scenario:
  name: base
  participants:
    alice:
      birth_date: 1970-03-15
      high3_salary: 110000.0
      service_years: 30.0
      retirement_date: 2032-06-30
      ss_start_age: 62
      tsp:
        traditional_balance: 600000.0
        roth_balance: 100000.0
        strategy: variable_percentage
        withdrawal_rate: 0.04
config:
  projection_years: 30
";

    #[test]
    fn test_load_plan_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PLAN_YAML.as_bytes()).unwrap();

        let plan = load_plan(file.path()).unwrap();
        assert_eq!(plan.scenario.name, "base");
        let alice = plan.scenario.participant("alice").unwrap();
        assert_eq!(alice.ss_start_age, 62);
        assert_eq!(alice.tsp.total_balance(), 700_000.0);

        // Explicit config fields override; the rest keep defaults
        assert_eq!(plan.config.projection_years, 30);
        assert_eq!(plan.config.annual_cola, 0.02);
    }

    #[test]
    fn test_missing_plan_file_reports_path() {
        let err = load_plan(Path::new("/nonexistent/plan.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/plan.yaml"));
    }

    #[test]
    fn test_build_transforms_preserves_order() {
        let specs = vec![
            "postpone_retirement:participant=alice,months=6".to_string(),
            "delay_ss_claim:participant=alice,age=67".to_string(),
        ];
        let transforms = build_transforms(&specs).unwrap();
        assert_eq!(transforms.len(), 2);
        assert_eq!(transforms[0].name(), "postpone_retirement");
        assert_eq!(transforms[1].name(), "delay_ss_claim");
    }

    #[test]
    fn test_bad_transform_spec_names_the_spec() {
        let specs = vec!["postpone_retirement:months=6".to_string()];
        let err = build_transforms(&specs).unwrap_err();
        assert!(err.to_string().contains("postpone_retirement"));
    }
}
