//! Rendering of the output specification against a model's current values

use crate::ast::Node;
use crate::engine::{Engine, Value};
use crate::model::{Model, ModelError, ModelResult, TheoryId, VarKind};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Output specification: literal and variable-reference nodes written in order.
///
/// Strings are written verbatim, so the specification carries its own
/// names, separators and newlines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Printer {
    output: Vec<Node>,
}

impl Printer {
    pub fn new(output: Vec<Node>) -> Self {
        Self { output }
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Write every node of the specification for the model's current solution.
    ///
    /// A variable with no value in the current solution (or with no solution
    /// at all) is written as its fixed value or declared domain.
    pub fn print<E: Engine>(&self, out: &mut dyn Write, model: &Model<E>) -> ModelResult<()> {
        for node in &self.output {
            write_node(out, model, node)?;
        }
        Ok(())
    }
}

fn write_node<E: Engine>(out: &mut dyn Write, model: &Model<E>, node: &Node) -> ModelResult<()> {
    match node {
        Node::Str(text) => write!(out, "{}", text)?,
        Node::Bool(value) => write!(out, "{}", value)?,
        Node::Int(value) => write!(out, "{}", value)?,
        Node::Float(value) => write!(out, "{:?}", value)?,
        Node::Set(lit) => write!(out, "{}", lit)?,
        Node::Atom(name) => write!(out, "{}", name)?,
        Node::IntVar(index) => {
            let var = model
                .variables()
                .int(*index)
                .map_err(|_| unresolved(VarKind::Int, *index))?;
            match current_value(model, var.id()) {
                Some(value) => write!(out, "{}", value.as_int())?,
                None => match var.domain().fixed_value() {
                    Some(value) => write!(out, "{}", value)?,
                    None => write!(out, "{}", var.domain())?,
                },
            }
        }
        Node::BoolVar(index) => {
            let var = model
                .variables()
                .bool(*index)
                .map_err(|_| unresolved(VarKind::Bool, *index))?;
            let value = match current_value(model, var.id()) {
                Some(value) => Some(value.as_int() != 0),
                None => var.fixed(),
            };
            match value {
                Some(value) => write!(out, "{}", value)?,
                None => write!(out, "false..true")?,
            }
        }
        Node::SetVar(index) => {
            model
                .variables()
                .set(*index)
                .map_err(|_| unresolved(VarKind::Set, *index))?;
            write!(out, "{{}}")?;
        }
        Node::Array(items) => {
            write!(out, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(out, ", ")?;
                }
                write_node(out, model, item)?;
            }
            write!(out, "]")?;
        }
        Node::Call { id, args } => {
            write!(out, "{}(", id)?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(out, ", ")?;
                }
                write_node(out, model, arg)?;
            }
            write!(out, ")")?;
        }
    }
    Ok(())
}

fn current_value<E: Engine>(model: &Model<E>, id: TheoryId) -> Option<Value> {
    model.current_solution().and_then(|solution| solution.get(id))
}

fn unresolved(kind: VarKind, index: usize) -> ModelError {
    ModelError::UnresolvedVariable { kind, index }
}
