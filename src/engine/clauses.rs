//! CNF clauses and the cardinality helpers used by the direct encoding

use itertools::Itertools;

/// A disjunction of literals; positive for a variable, negative for its negation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub literals: Vec<i32>,
}

impl Clause {
    pub fn new(literals: Vec<i32>) -> Self {
        Self { literals }
    }

    pub fn unit(literal: i32) -> Self {
        Self {
            literals: vec![literal],
        }
    }

    pub fn binary(lit1: i32, lit2: i32) -> Self {
        Self {
            literals: vec![lit1, lit2],
        }
    }

    /// An empty clause can never be satisfied
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }
}

/// Pairwise encoding of "at most one of `literals` holds"
pub fn at_most_one(literals: &[i32]) -> Vec<Clause> {
    literals
        .iter()
        .tuple_combinations()
        .map(|(&a, &b)| Clause::binary(-a, -b))
        .collect()
}

/// "Exactly one of `literals` holds"
pub fn exactly_one(literals: &[i32]) -> Vec<Clause> {
    let mut clauses = Vec::with_capacity(1 + literals.len() * literals.len() / 2);
    clauses.push(Clause::new(literals.to_vec()));
    clauses.extend(at_most_one(literals));
    clauses
}
