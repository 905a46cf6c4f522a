//! Sequential transform application
//!
//! Applies an ordered transform list to a base scenario. Each transform is
//! validated against the current (possibly already-transformed) scenario
//! before it runs, and the pipeline short-circuits on the first failure.
//! Because every transform returns a fresh scenario, a failed pipeline can
//! never leave a half-applied result behind — the caller's base is untouched
//! and no partial value escapes.

use crate::error::TransformError;
use crate::model::Scenario;

use super::ScenarioTransform;

/// Apply `transforms` in order to a deep copy of `base`.
///
/// An empty list still returns a deep copy, never the caller's allocation,
/// so callers always own an independent result. Deterministic: the same
/// ordered list applied to the same base yields an identical scenario.
pub fn apply_transforms(
    base: &Scenario,
    transforms: &[ScenarioTransform],
) -> Result<Scenario, TransformError> {
    let mut current = base.deep_copy();
    for transform in transforms {
        transform.validate(&current)?;
        current = transform.apply(&current)?;
    }
    Ok(current)
}
