//! The engine seam: what the model hands over, and the gateway that forwards it

use crate::ast::Node;
use crate::model::{Domain, ModelError, ModelResult, TheoryId};
use crate::search::SearchConfig;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("constraint `{0}' is not supported")]
    Unsupported(String),
    #[error("`{name}' expects {expected} arguments, found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("argument {position} of `{name}' must be {expected}")]
    TypeMismatch {
        name: String,
        position: usize,
        expected: &'static str,
    },
    #[error("domain of variable {id} has {size} values, more than the limit of {limit}")]
    DomainTooLarge { id: TheoryId, size: u64, limit: u64 },
    #[error("variable {0} was never declared to the engine")]
    UnknownTerm(TheoryId),
}

/// A variable as announced to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableDecl {
    Int { id: TheoryId, domain: Domain },
    Bool { id: TheoryId, fixed: Option<bool> },
    Set { index: usize },
}

/// A constraint argument with every reference replaced by its theory id
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedArg {
    Bool { value: bool, id: TheoryId },
    Int { value: i64, id: TheoryId },
    Float(f64),
    Set(Domain),
    Str(String),
    Atom { name: String, id: TheoryId },
    IntVar { index: usize, id: TheoryId },
    BoolVar { index: usize, id: TheoryId },
    SetVar { index: usize },
    Array { id: TheoryId, items: Vec<ResolvedArg> },
    Call {
        name: String,
        id: TheoryId,
        args: Vec<ResolvedArg>,
    },
}

impl ResolvedArg {
    /// Theory id of the term, if it has one
    pub fn id(&self) -> Option<TheoryId> {
        match self {
            ResolvedArg::Bool { id, .. }
            | ResolvedArg::Int { id, .. }
            | ResolvedArg::Atom { id, .. }
            | ResolvedArg::IntVar { id, .. }
            | ResolvedArg::BoolVar { id, .. }
            | ResolvedArg::Array { id, .. }
            | ResolvedArg::Call { id, .. } => Some(*id),
            ResolvedArg::Float(_)
            | ResolvedArg::Set(_)
            | ResolvedArg::Str(_)
            | ResolvedArg::SetVar { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConstraint {
    pub name: String,
    /// Interned id of the operator name
    pub symbol: TheoryId,
    /// Id of the constraint term itself
    pub term: TheoryId,
    /// Element-access term, for `*_element` constraints
    pub element: Option<TheoryId>,
    pub args: Vec<ResolvedArg>,
    pub annotation: Option<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Objective {
    Satisfy,
    Minimize(ResolvedArg),
    Maximize(ResolvedArg),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Bool(bool),
}

impl Value {
    /// Integer reading of the value; Booleans count as 0/1
    pub fn as_int(self) -> i64 {
        match self {
            Value::Int(value) => value,
            Value::Bool(value) => value as i64,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Bool(value) => write!(f, "{}", value),
        }
    }
}

/// One assignment produced by the engine, keyed by variable id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    pub values: HashMap<TheoryId, Value>,
}

impl Solution {
    pub fn get(&self, id: TheoryId) -> Option<Value> {
        self.values.get(&id).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolveOutcome {
    pub solutions: Vec<Solution>,
    /// The search space was exhausted: no further (or better) solution exists
    pub complete: bool,
}

/// Operations the model consumes from a solving engine
pub trait Engine {
    fn declare_variable(&mut self, decl: &VariableDecl) -> Result<(), EngineError>;

    fn post_constraint(&mut self, constraint: &ResolvedConstraint) -> Result<(), EngineError>;

    fn set_objective(&mut self, objective: &Objective) -> Result<(), EngineError>;

    fn configure_search(&mut self, config: &SearchConfig) -> Result<(), EngineError>;

    fn solve(&mut self) -> Result<SolveOutcome, EngineError>;

    fn name(&self) -> &'static str;
}

/// Forwards resolved model parts to the engine and reports its rejections
#[derive(Debug)]
pub struct Gateway<E: Engine> {
    engine: E,
    constraints_posted: usize,
}

impl<E: Engine> Gateway<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            constraints_posted: 0,
        }
    }

    pub fn declare(&mut self, decl: &VariableDecl) -> ModelResult<()> {
        self.engine.declare_variable(decl)?;
        Ok(())
    }

    pub fn post(&mut self, constraint: &ResolvedConstraint) -> ModelResult<()> {
        debug!(constraint = %constraint.name, engine = self.engine.name(), "posting constraint");
        self.engine
            .post_constraint(constraint)
            .map_err(|reason| ModelError::ConstraintRejected {
                constraint: constraint.name.clone(),
                reason,
            })?;
        self.constraints_posted += 1;
        Ok(())
    }

    pub fn set_goal(&mut self, objective: &Objective) -> ModelResult<()> {
        self.engine.set_objective(objective)?;
        Ok(())
    }

    pub fn configure(&mut self, config: &SearchConfig) -> ModelResult<()> {
        self.engine.configure_search(config)?;
        Ok(())
    }

    pub fn solve(&mut self) -> ModelResult<SolveOutcome> {
        Ok(self.engine.solve()?)
    }

    pub fn constraints_posted(&self) -> usize {
        self.constraints_posted
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}
