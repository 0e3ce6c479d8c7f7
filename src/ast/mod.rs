//! Parsed model input: expression nodes, variable specs and the model document

pub mod document;
pub mod node;
pub mod spec;

pub use document::{ConstraintItem, Declared, ModelDocument, SolveItem};
pub use node::{ConExpr, Node, SetLit};
pub use spec::{BoolVarSpec, IntVarSpec, SetVarSpec};
