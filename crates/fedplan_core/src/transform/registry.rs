//! Transform and template registries
//!
//! The registries are explicitly constructed, immutable-after-build lookup
//! tables — not process-wide singletons — so pipelines stay testable in
//! isolation. `TransformRegistry` maps stable names to constructors taking
//! flat key=value parameter maps; `TemplateRegistry` maps names to reusable
//! transform bundles.
//!
//! Spec string grammar: `name:key1=value1,key2=value2`. Parameters are
//! comma-separated, keys and values `=`-split and whitespace-trimmed.

use std::str::FromStr;

use jiff::civil::Date;
use rustc_hash::FxHashMap;

use crate::error::TransformError;
use crate::model::{ConversionSource, RothConversion, TspTransferMode, WithdrawalStrategy};

use super::ScenarioTransform;

/// Flat parameter map parsed from a spec string
pub type TransformParams = FxHashMap<String, String>;

type Constructor = fn(&TransformParams) -> Result<ScenarioTransform, TransformError>;

/// Lookup table from transform name to constructor
pub struct TransformRegistry {
    constructors: FxHashMap<&'static str, Constructor>,
}

impl TransformRegistry {
    /// Registry with every built-in transform registered
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut constructors: FxHashMap<&'static str, Constructor> = FxHashMap::default();
        constructors.insert("postpone_retirement", build_postpone_retirement);
        constructors.insert("set_retirement_date", build_set_retirement_date);
        constructors.insert("delay_ss_claim", build_delay_ss_claim);
        constructors.insert("modify_tsp_strategy", build_modify_tsp_strategy);
        constructors.insert("adjust_tsp_rate", build_adjust_tsp_rate);
        constructors.insert("set_tsp_target_income", build_set_tsp_target_income);
        constructors.insert("enable_roth_conversion", build_enable_roth_conversion);
        constructors.insert("modify_roth_conversion", build_modify_roth_conversion);
        constructors.insert("remove_roth_conversion", build_remove_roth_conversion);
        constructors.insert("set_mortality_date", build_set_mortality_date);
        constructors.insert(
            "set_survivor_spending_factor",
            build_set_survivor_spending_factor,
        );
        constructors.insert("set_tsp_transfer_mode", build_set_tsp_transfer_mode);
        Self { constructors }
    }

    /// Registered transform names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.constructors.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Build a transform by name from a parameter map
    pub fn build(
        &self,
        name: &str,
        params: &TransformParams,
    ) -> Result<ScenarioTransform, TransformError> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| TransformError::UnknownTransform(name.to_string()))?;
        constructor(params)
    }

    /// Parse a `name:key=value,...` spec string and build the transform
    pub fn from_spec(&self, spec: &str) -> Result<ScenarioTransform, TransformError> {
        let (name, params) = parse_spec(spec)?;
        self.build(&name, &params)
    }
}

/// Named bundles of transforms for reuse across scenarios
#[derive(Default)]
pub struct TemplateRegistry {
    templates: FxHashMap<String, Vec<ScenarioTransform>>,
}

impl TemplateRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration; call before first use, then treat as
    /// read-only.
    #[must_use]
    pub fn with_template(
        mut self,
        name: impl Into<String>,
        transforms: Vec<ScenarioTransform>,
    ) -> Self {
        self.templates.insert(name.into(), transforms);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[ScenarioTransform]> {
        self.templates.get(name).map(Vec::as_slice)
    }

    /// Clone out a template's transforms, erroring on unknown names
    pub fn expand(&self, name: &str) -> Result<Vec<ScenarioTransform>, TransformError> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| TransformError::UnknownTemplate(name.to_string()))
    }

    /// Registered template names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Parse `name:key1=value1,key2=value2` into a name and parameter map.
///
/// A bare `name` with no colon is accepted and yields an empty map.
pub fn parse_spec(spec: &str) -> Result<(String, TransformParams), TransformError> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(TransformError::Spec {
            spec: spec.to_string(),
            reason: "empty spec".to_string(),
        });
    }

    let (name, rest) = match spec.split_once(':') {
        Some((name, rest)) => (name.trim(), rest.trim()),
        None => (spec, ""),
    };

    if name.is_empty() {
        return Err(TransformError::Spec {
            spec: spec.to_string(),
            reason: "missing transform name".to_string(),
        });
    }

    let mut params = TransformParams::default();
    if !rest.is_empty() {
        for pair in rest.split(',') {
            let (key, value) = pair.split_once('=').ok_or_else(|| TransformError::Spec {
                spec: spec.to_string(),
                reason: format!("parameter {pair:?} is not key=value"),
            })?;
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() {
                return Err(TransformError::Spec {
                    spec: spec.to_string(),
                    reason: format!("empty key in {pair:?}"),
                });
            }
            params.insert(key.to_string(), value.to_string());
        }
    }

    Ok((name.to_string(), params))
}

// ============================================================================
// Parameter helpers
// ============================================================================

fn require<'a>(
    transform: &'static str,
    params: &'a TransformParams,
    key: &str,
) -> Result<&'a str, TransformError> {
    params
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| TransformError::InvalidParameter {
            transform,
            reason: format!("missing parameter {key:?}"),
        })
}

fn parse_value<T: FromStr>(
    transform: &'static str,
    key: &str,
    raw: &str,
) -> Result<T, TransformError>
where
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e| TransformError::InvalidParameter {
        transform,
        reason: format!("parameter {key}={raw:?}: {e}"),
    })
}

fn required<T: FromStr>(
    transform: &'static str,
    params: &TransformParams,
    key: &str,
) -> Result<T, TransformError>
where
    T::Err: std::fmt::Display,
{
    parse_value(transform, key, require(transform, params, key)?)
}

// ============================================================================
// Constructors
// ============================================================================

fn build_postpone_retirement(params: &TransformParams) -> Result<ScenarioTransform, TransformError> {
    const NAME: &str = "postpone_retirement";
    Ok(ScenarioTransform::PostponeRetirement {
        participant: require(NAME, params, "participant")?.to_string(),
        months: required(NAME, params, "months")?,
    })
}

fn build_set_retirement_date(params: &TransformParams) -> Result<ScenarioTransform, TransformError> {
    const NAME: &str = "set_retirement_date";
    let date: Date = required(NAME, params, "date")?;
    Ok(ScenarioTransform::SetRetirementDate {
        participant: require(NAME, params, "participant")?.to_string(),
        date,
    })
}

fn build_delay_ss_claim(params: &TransformParams) -> Result<ScenarioTransform, TransformError> {
    const NAME: &str = "delay_ss_claim";
    Ok(ScenarioTransform::DelaySsClaim {
        participant: require(NAME, params, "participant")?.to_string(),
        age: required(NAME, params, "age")?,
    })
}

fn build_modify_tsp_strategy(params: &TransformParams) -> Result<ScenarioTransform, TransformError> {
    const NAME: &str = "modify_tsp_strategy";
    let strategy: WithdrawalStrategy = required(NAME, params, "strategy")?;
    let preserve_settings = match params.get("preserve") {
        Some(raw) => parse_value(NAME, "preserve", raw)?,
        None => false,
    };
    Ok(ScenarioTransform::ModifyTspStrategy {
        participant: require(NAME, params, "participant")?.to_string(),
        strategy,
        preserve_settings,
    })
}

fn build_adjust_tsp_rate(params: &TransformParams) -> Result<ScenarioTransform, TransformError> {
    const NAME: &str = "adjust_tsp_rate";
    Ok(ScenarioTransform::AdjustTspRate {
        participant: require(NAME, params, "participant")?.to_string(),
        rate: required(NAME, params, "rate")?,
    })
}

fn build_set_tsp_target_income(
    params: &TransformParams,
) -> Result<ScenarioTransform, TransformError> {
    const NAME: &str = "set_tsp_target_income";
    Ok(ScenarioTransform::SetTspTargetIncome {
        participant: require(NAME, params, "participant")?.to_string(),
        monthly_amount: required(NAME, params, "monthly_amount")?,
    })
}

fn build_enable_roth_conversion(
    params: &TransformParams,
) -> Result<ScenarioTransform, TransformError> {
    const NAME: &str = "enable_roth_conversion";
    let source: ConversionSource = required(NAME, params, "source")?;
    Ok(ScenarioTransform::EnableRothConversion {
        participant: require(NAME, params, "participant")?.to_string(),
        conversions: vec![RothConversion {
            year: required(NAME, params, "year")?,
            amount: required(NAME, params, "amount")?,
            source,
        }],
    })
}

fn build_modify_roth_conversion(
    params: &TransformParams,
) -> Result<ScenarioTransform, TransformError> {
    const NAME: &str = "modify_roth_conversion";
    Ok(ScenarioTransform::ModifyRothConversion {
        participant: require(NAME, params, "participant")?.to_string(),
        year: required(NAME, params, "year")?,
        amount: required(NAME, params, "amount")?,
    })
}

fn build_remove_roth_conversion(
    params: &TransformParams,
) -> Result<ScenarioTransform, TransformError> {
    const NAME: &str = "remove_roth_conversion";
    Ok(ScenarioTransform::RemoveRothConversion {
        participant: require(NAME, params, "participant")?.to_string(),
        year: required(NAME, params, "year")?,
    })
}

fn build_set_mortality_date(params: &TransformParams) -> Result<ScenarioTransform, TransformError> {
    const NAME: &str = "set_mortality_date";
    let date: Date = required(NAME, params, "date")?;
    Ok(ScenarioTransform::SetMortalityDate {
        participant: require(NAME, params, "participant")?.to_string(),
        date,
    })
}

fn build_set_survivor_spending_factor(
    params: &TransformParams,
) -> Result<ScenarioTransform, TransformError> {
    const NAME: &str = "set_survivor_spending_factor";
    Ok(ScenarioTransform::SetSurvivorSpendingFactor {
        participant: require(NAME, params, "participant")?.to_string(),
        factor: required(NAME, params, "factor")?,
    })
}

fn build_set_tsp_transfer_mode(
    params: &TransformParams,
) -> Result<ScenarioTransform, TransformError> {
    const NAME: &str = "set_tsp_transfer_mode";
    let mode: TspTransferMode = required(NAME, params, "mode")?;
    Ok(ScenarioTransform::SetTspTransferMode {
        participant: require(NAME, params, "participant")?.to_string(),
        mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spec_basic() {
        let (name, params) = parse_spec("postpone_retirement:participant=Alice,months=12").unwrap();
        assert_eq!(name, "postpone_retirement");
        assert_eq!(params.get("participant").unwrap(), "Alice");
        assert_eq!(params.get("months").unwrap(), "12");
    }

    #[test]
    fn test_parse_spec_trims_whitespace() {
        let (name, params) =
            parse_spec("  delay_ss_claim : participant = Bob , age = 67 ").unwrap();
        assert_eq!(name, "delay_ss_claim");
        assert_eq!(params.get("participant").unwrap(), "Bob");
        assert_eq!(params.get("age").unwrap(), "67");
    }

    #[test]
    fn test_parse_spec_rejects_malformed_pair() {
        assert!(parse_spec("delay_ss_claim:participant").is_err());
        assert!(parse_spec("").is_err());
        assert!(parse_spec(":age=67").is_err());
    }

    #[test]
    fn test_registry_builds_postpone() {
        let registry = TransformRegistry::with_defaults();
        let transform = registry
            .from_spec("postpone_retirement:participant=Alice,months=12")
            .unwrap();
        assert_eq!(
            transform,
            ScenarioTransform::PostponeRetirement {
                participant: "Alice".to_string(),
                months: 12,
            }
        );
    }

    #[test]
    fn test_registry_builds_typed_parameters() {
        let registry = TransformRegistry::with_defaults();

        let t = registry
            .from_spec("modify_tsp_strategy:participant=Alice,strategy=need_based,preserve=true")
            .unwrap();
        assert_eq!(
            t,
            ScenarioTransform::ModifyTspStrategy {
                participant: "Alice".to_string(),
                strategy: WithdrawalStrategy::NeedBased,
                preserve_settings: true,
            }
        );

        let t = registry
            .from_spec("set_retirement_date:participant=Alice,date=2033-01-31")
            .unwrap();
        assert!(matches!(t, ScenarioTransform::SetRetirementDate { .. }));

        let t = registry
            .from_spec(
                "enable_roth_conversion:participant=Alice,year=2034,amount=25000,source=traditional_tsp",
            )
            .unwrap();
        assert!(matches!(t, ScenarioTransform::EnableRothConversion { .. }));
    }

    #[test]
    fn test_registry_unknown_name() {
        let registry = TransformRegistry::with_defaults();
        let err = registry.from_spec("time_travel:participant=Alice").unwrap_err();
        assert!(matches!(err, TransformError::UnknownTransform(_)));
    }

    #[test]
    fn test_registry_missing_parameter() {
        let registry = TransformRegistry::with_defaults();
        let err = registry
            .from_spec("postpone_retirement:participant=Alice")
            .unwrap_err();
        assert!(err.to_string().contains("months"));
    }

    #[test]
    fn test_registry_rejects_negative_months() {
        let registry = TransformRegistry::with_defaults();
        assert!(
            registry
                .from_spec("postpone_retirement:participant=Alice,months=-3")
                .is_err()
        );
    }

    #[test]
    fn test_template_registry() {
        let templates = TemplateRegistry::new().with_template(
            "work_one_more_year",
            vec![ScenarioTransform::PostponeRetirement {
                participant: "Alice".to_string(),
                months: 12,
            }],
        );

        assert_eq!(templates.expand("work_one_more_year").unwrap().len(), 1);
        assert!(matches!(
            templates.expand("nope").unwrap_err(),
            TransformError::UnknownTemplate(_)
        ));
        assert_eq!(templates.names(), vec!["work_one_more_year"]);
    }

    #[test]
    fn test_registry_lists_all_names() {
        let registry = TransformRegistry::with_defaults();
        assert_eq!(registry.names().len(), 12);
    }
}
