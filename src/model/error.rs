//! Failures raised while building or running a model

use super::container::Phase;
use super::interner::InternKey;
use super::variables::VarKind;
use crate::engine::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("{0} was never interned")]
    NotInterned(InternKey),
    #[error("model must be initialized before declaring variables or posting constraints")]
    NotInitialized,
    #[error("{kind} variable {index} has not been declared")]
    UnknownVariable { kind: VarKind, index: usize },
    #[error("integer variable `{name}' has neither an assigned value nor a domain")]
    MissingDomain { name: String },
    #[error("integer variable `{name}' has an empty domain")]
    EmptyDomain { name: String },
    #[error("integer variable {int_index} is already aliased to Boolean variable {existing}")]
    DoubleAlias { int_index: usize, existing: usize },
    #[error("solve goal has already been set")]
    GoalAlreadySet,
    #[error("constraint `{constraint}' rejected by engine: {reason}")]
    ConstraintRejected { constraint: String, reason: EngineError },
    #[error("output specification references {kind} variable {index} which is not in the model")]
    UnresolvedVariable { kind: VarKind, index: usize },
    #[error("`{operation}' is not allowed in phase {phase:?}")]
    OutOfPhase { operation: &'static str, phase: Phase },
    #[error("model was sized for {capacity} {kind} variables")]
    TooManyVariables { kind: VarKind, capacity: usize },
    #[error("engine failure: {0}")]
    Engine(#[from] EngineError),
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

pub type ModelResult<T> = std::result::Result<T, ModelError>;
