//! Parsed expression nodes: constraint arguments, annotations and output items

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Set literal as written in the model: a closed range or explicit values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetLit {
    Range { lo: i64, hi: i64 },
    Values(Vec<i64>),
}

/// A node of the parsed model. Variables are referenced by their
/// declaration index within their kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Bool(bool),
    Int(i64),
    Float(f64),
    Set(SetLit),
    Str(String),
    Atom(String),
    IntVar(usize),
    BoolVar(usize),
    SetVar(usize),
    Array(Vec<Node>),
    Call { id: String, args: Vec<Node> },
}

impl Node {
    pub fn call(id: impl Into<String>, args: Vec<Node>) -> Self {
        Node::Call {
            id: id.into(),
            args,
        }
    }

    pub fn atom(name: impl Into<String>) -> Self {
        Node::Atom(name.into())
    }

    /// Name of a call or atom, used to recognize annotations
    pub fn head(&self) -> Option<&str> {
        match self {
            Node::Call { id, .. } => Some(id),
            Node::Atom(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Node::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for SetLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetLit::Range { lo, hi } => write!(f, "{}..{}", lo, hi),
            SetLit::Values(values) => write!(f, "{{{}}}", values.iter().join(",")),
        }
    }
}

/// Renders the node in model syntax, variables as `iv[i]`, `bv[i]`, `sv[i]`
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Bool(value) => write!(f, "{}", value),
            Node::Int(value) => write!(f, "{}", value),
            Node::Float(value) => write!(f, "{:?}", value),
            Node::Set(lit) => write!(f, "{}", lit),
            Node::Str(text) => write!(f, "{:?}", text),
            Node::Atom(name) => f.write_str(name),
            Node::IntVar(index) => write!(f, "iv[{}]", index),
            Node::BoolVar(index) => write!(f, "bv[{}]", index),
            Node::SetVar(index) => write!(f, "sv[{}]", index),
            Node::Array(items) => write!(f, "[{}]", items.iter().join(", ")),
            Node::Call { id, args } => write!(f, "{}({})", id, args.iter().join(", ")),
        }
    }
}

/// A constraint item: operator name plus arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConExpr {
    pub id: String,
    pub args: Vec<Node>,
}

impl ConExpr {
    pub fn new(id: impl Into<String>, args: Vec<Node>) -> Self {
        Self {
            id: id.into(),
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_head() {
        assert_eq!(Node::atom("first_fail").head(), Some("first_fail"));
        assert_eq!(Node::call("int_search", vec![]).head(), Some("int_search"));
        assert_eq!(Node::Int(3).head(), None);
    }

    #[test]
    fn test_node_json_shape() {
        let node: Node = serde_json::from_str(r#"{"call": {"id": "int_search", "args": [{"array": [{"int_var": 0}]}, {"atom": "input_order"}]}}"#).unwrap();

        match node {
            Node::Call { id, args } => {
                assert_eq!(id, "int_search");
                assert_eq!(args[0].as_array(), Some(&[Node::IntVar(0)][..]));
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_node_display() {
        let ann = Node::call(
            "int_search",
            vec![
                Node::Array(vec![Node::IntVar(0), Node::IntVar(1)]),
                Node::atom("first_fail"),
                Node::Set(SetLit::Values(vec![1, 2])),
            ],
        );
        assert_eq!(ann.to_string(), "int_search([iv[0], iv[1]], first_fail, {1,2})");
    }

    #[test]
    fn test_set_literal_json_shape() {
        let range: SetLit = serde_json::from_str(r#"{"range": {"lo": 1, "hi": 3}}"#).unwrap();
        let values: SetLit = serde_json::from_str(r#"{"values": [1, 5]}"#).unwrap();
        assert_eq!(range, SetLit::Range { lo: 1, hi: 3 });
        assert_eq!(values, SetLit::Values(vec![1, 5]));
    }
}
