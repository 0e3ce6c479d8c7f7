//! Variable specifications produced by the parser

use super::node::SetLit;
use serde::{Deserialize, Serialize};

/// Integer variable declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntVarSpec {
    /// Statically assigned value
    pub assigned: Option<i64>,
    /// Declared domain
    pub domain: Option<SetLit>,
    /// Index of an earlier integer variable this one is an alias of
    pub alias: Option<usize>,
    /// Introduced by the flattener rather than written by the modeller
    pub introduced: bool,
}

impl IntVarSpec {
    pub fn with_domain(domain: SetLit) -> Self {
        Self {
            domain: Some(domain),
            ..Self::default()
        }
    }

    pub fn assigned(value: i64) -> Self {
        Self {
            assigned: Some(value),
            ..Self::default()
        }
    }

    pub fn alias_of(index: usize) -> Self {
        Self {
            alias: Some(index),
            ..Self::default()
        }
    }

    pub fn introduced(mut self) -> Self {
        self.introduced = true;
        self
    }
}

/// Boolean variable declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoolVarSpec {
    pub assigned: Option<bool>,
    /// Index of an earlier Boolean variable this one is an alias of
    pub alias: Option<usize>,
    pub introduced: bool,
}

impl BoolVarSpec {
    pub fn assigned(value: bool) -> Self {
        Self {
            assigned: Some(value),
            ..Self::default()
        }
    }

    pub fn introduced(mut self) -> Self {
        self.introduced = true;
        self
    }
}

/// Set variable declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetVarSpec {
    pub introduced: bool,
}
