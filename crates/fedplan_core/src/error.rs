use std::fmt;

use crate::model::WithdrawalStrategy;
use crate::solver::{OptimizationGoal, OptimizationTarget};

/// Errors from transform validation, application, or construction.
///
/// Every variant names the transform it came from so pipeline failures can be
/// attributed to a specific step.
#[derive(Debug, Clone)]
pub enum TransformError {
    ParticipantNotFound {
        transform: &'static str,
        participant: String,
    },
    /// A required scenario field is absent (e.g. postponing a retirement date
    /// that was never set)
    MissingField {
        transform: &'static str,
        participant: String,
        field: &'static str,
    },
    /// A parameter value is outside its allowed range
    InvalidParameter {
        transform: &'static str,
        reason: String,
    },
    /// The transform requires a different withdrawal strategy than the one
    /// currently on the scenario
    IncompatibleStrategy {
        transform: &'static str,
        participant: String,
        strategy: WithdrawalStrategy,
        required: &'static str,
    },
    /// A `name:key=value,...` spec string could not be parsed
    Spec { spec: String, reason: String },
    /// The registry has no constructor under this name
    UnknownTransform(String),
    /// The template registry has no bundle under this name
    UnknownTemplate(String),
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::ParticipantNotFound {
                transform,
                participant,
            } => {
                write!(f, "{transform}: participant {participant:?} not found")
            }
            TransformError::MissingField {
                transform,
                participant,
                field,
            } => {
                write!(f, "{transform}: participant {participant:?} has no {field}")
            }
            TransformError::InvalidParameter { transform, reason } => {
                write!(f, "{transform}: {reason}")
            }
            TransformError::IncompatibleStrategy {
                transform,
                participant,
                strategy,
                required,
            } => {
                write!(
                    f,
                    "{transform}: participant {participant:?} uses strategy {strategy:?} but {required} is required"
                )
            }
            TransformError::Spec { spec, reason } => {
                write!(f, "bad transform spec {spec:?}: {reason}")
            }
            TransformError::UnknownTransform(name) => {
                write!(f, "unknown transform {name:?}")
            }
            TransformError::UnknownTemplate(name) => {
                write!(f, "unknown template {name:?}")
            }
        }
    }
}

impl std::error::Error for TransformError {}

/// Errors from the external scenario evaluation contract
#[derive(Debug, Clone)]
pub enum EvaluateError {
    /// Evaluation was cancelled by user request
    Cancelled,
    /// The scenario cannot be projected (e.g. no retirement date set)
    InvalidScenario(String),
    /// Configuration error
    Config(String),
}

impl fmt::Display for EvaluateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluateError::Cancelled => write!(f, "evaluation cancelled"),
            EvaluateError::InvalidScenario(msg) => write!(f, "invalid scenario: {msg}"),
            EvaluateError::Config(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for EvaluateError {}

/// Errors from the optimization solver
#[derive(Debug, Clone)]
pub enum SolverError {
    /// Constraint validation failed before any iteration ran
    InvalidConstraints(String),
    /// The request itself is malformed for the chosen target/goal
    InvalidRequest(String),
    /// Building a candidate scenario failed
    Transform(TransformError),
    /// A non-recoverable evaluation failure
    Evaluation {
        operation: &'static str,
        source: EvaluateError,
    },
    /// The search exhausted its space without a single successful evaluation
    NoCandidates {
        operation: &'static str,
        message: String,
    },
    /// Optimization over this target is a known gap, not a silent no-op
    NotImplemented { target: OptimizationTarget },
    /// Optimization was cancelled by user request
    Cancelled,
    /// Every (target, goal) pair of a multi-dimensional run failed
    AllPairsFailed { goals: Vec<OptimizationGoal> },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::InvalidConstraints(msg) => write!(f, "invalid constraints: {msg}"),
            SolverError::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            SolverError::Transform(e) => write!(f, "candidate construction failed: {e}"),
            SolverError::Evaluation { operation, source } => {
                write!(f, "{operation}: evaluation failed: {source}")
            }
            SolverError::NoCandidates { operation, message } => {
                write!(f, "{operation}: no candidate evaluated successfully: {message}")
            }
            SolverError::NotImplemented { target } => {
                write!(f, "optimization target {target:?} is not implemented")
            }
            SolverError::Cancelled => write!(f, "optimization cancelled"),
            SolverError::AllPairsFailed { goals } => {
                write!(
                    f,
                    "no (target, goal) pair succeeded for goals {goals:?}"
                )
            }
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolverError::Transform(e) => Some(e),
            SolverError::Evaluation { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<TransformError> for SolverError {
    fn from(e: TransformError) -> Self {
        SolverError::Transform(e)
    }
}
