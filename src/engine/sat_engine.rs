//! SAT-backed engine on CaDiCaL with a direct integer encoding

use super::clauses::{exactly_one, Clause};
use super::gateway::{
    Engine, EngineError, Objective, ResolvedArg, ResolvedConstraint, Solution, SolveOutcome, Value,
    VariableDecl,
};
use crate::model::TheoryId;
use crate::search::SearchConfig;
use cadical::Solver;
use itertools::Itertools;
use std::collections::HashMap;
use std::ops::Not;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoolTerm {
    Const(bool),
    Lit(i32),
}

impl Not for BoolTerm {
    type Output = BoolTerm;

    fn not(self) -> BoolTerm {
        match self {
            BoolTerm::Const(value) => BoolTerm::Const(!value),
            BoolTerm::Lit(lit) => BoolTerm::Lit(-lit),
        }
    }
}

/// A constant, or one literal per value the variable can take
#[derive(Debug, Clone)]
enum IntTerm {
    Const(i64),
    Var(Vec<(i64, i32)>),
}

impl IntTerm {
    /// Candidate values with the literal selecting each; `None` means always
    fn options(&self) -> Vec<(i64, Option<i32>)> {
        match self {
            IntTerm::Const(value) => vec![(*value, None)],
            IntTerm::Var(encoding) => encoding.iter().map(|&(v, lit)| (v, Some(lit))).collect(),
        }
    }
}

fn int_relation(name: &str) -> Option<fn(i64, i64) -> bool> {
    let relation: fn(i64, i64) -> bool = match name {
        "int_eq" => |a, b| a == b,
        "int_ne" => |a, b| a != b,
        "int_le" => |a, b| a <= b,
        "int_lt" => |a, b| a < b,
        _ => return None,
    };
    Some(relation)
}

fn check_arity(constraint: &ResolvedConstraint, expected: usize) -> Result<(), EngineError> {
    if constraint.args.len() != expected {
        return Err(EngineError::ArityMismatch {
            name: constraint.name.clone(),
            expected,
            found: constraint.args.len(),
        });
    }
    Ok(())
}

fn type_mismatch(name: &str, position: usize, expected: &'static str) -> EngineError {
    EngineError::TypeMismatch {
        name: name.to_string(),
        position,
        expected,
    }
}

/// Options for the SAT engine
#[derive(Debug, Clone)]
pub struct SatOptions {
    /// Stop satisfaction search after this many solutions; `None` for all
    pub solution_limit: Option<usize>,
    /// Largest integer domain accepted for direct encoding
    pub max_domain_size: u64,
}

impl Default for SatOptions {
    fn default() -> Self {
        Self {
            solution_limit: Some(1),
            max_domain_size: 256,
        }
    }
}

/// Solves the handed-over model with CaDiCaL.
///
/// Booleans map to SAT variables. Integers get one literal per domain value
/// with an exactly-one constraint over them.
pub struct SatEngine {
    solver: Solver,
    options: SatOptions,
    next_var: i32,
    bools: HashMap<TheoryId, i32>,
    ints: HashMap<TheoryId, Vec<(i64, i32)>>,
    /// Declared variables in declaration order
    order: Vec<TheoryId>,
    objective: Objective,
    search: Option<SearchConfig>,
    clause_count: usize,
    infeasible: bool,
}

impl SatEngine {
    pub fn new(options: SatOptions) -> Self {
        Self {
            solver: Solver::new(),
            options,
            next_var: 0,
            bools: HashMap::new(),
            ints: HashMap::new(),
            order: Vec::new(),
            objective: Objective::Satisfy,
            search: None,
            clause_count: 0,
            infeasible: false,
        }
    }

    pub fn variable_count(&self) -> usize {
        self.next_var as usize
    }

    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    pub fn search(&self) -> Option<&SearchConfig> {
        self.search.as_ref()
    }

    fn new_var(&mut self) -> i32 {
        self.next_var += 1;
        self.next_var
    }

    fn add_clause(&mut self, clause: Clause) {
        if clause.is_empty() {
            debug!("empty clause added, model is infeasible");
            self.infeasible = true;
            return;
        }
        self.solver.add_clause(clause.literals.iter().copied());
        self.clause_count += 1;
    }

    /// Add a clause over terms, simplifying away constants
    fn add_terms(&mut self, terms: &[BoolTerm]) {
        let mut literals = Vec::with_capacity(terms.len());
        for term in terms {
            match *term {
                BoolTerm::Const(true) => return,
                BoolTerm::Const(false) => {}
                BoolTerm::Lit(lit) => literals.push(lit),
            }
        }
        self.add_clause(Clause::new(literals));
    }

    fn bool_of(&self, name: &str, position: usize, arg: &ResolvedArg) -> Result<BoolTerm, EngineError> {
        match arg {
            ResolvedArg::Bool { value, .. } => Ok(BoolTerm::Const(*value)),
            ResolvedArg::BoolVar { id, .. } => self
                .bools
                .get(id)
                .map(|&lit| BoolTerm::Lit(lit))
                .ok_or(EngineError::UnknownTerm(*id)),
            _ => Err(type_mismatch(name, position, "a Boolean")),
        }
    }

    fn int_of(&self, name: &str, position: usize, arg: &ResolvedArg) -> Result<IntTerm, EngineError> {
        match arg {
            ResolvedArg::Int { value, .. } => Ok(IntTerm::Const(*value)),
            ResolvedArg::Bool { value, .. } => Ok(IntTerm::Const(*value as i64)),
            ResolvedArg::IntVar { id, .. } => self
                .ints
                .get(id)
                .cloned()
                .map(IntTerm::Var)
                .ok_or(EngineError::UnknownTerm(*id)),
            ResolvedArg::BoolVar { id, .. } => {
                let lit = *self.bools.get(id).ok_or(EngineError::UnknownTerm(*id))?;
                Ok(IntTerm::Var(vec![(0, -lit), (1, lit)]))
            }
            _ => Err(type_mismatch(name, position, "an integer")),
        }
    }

    fn bool_array_of(
        &self,
        name: &str,
        position: usize,
        arg: &ResolvedArg,
    ) -> Result<Vec<BoolTerm>, EngineError> {
        match arg {
            ResolvedArg::Array { items, .. } => items
                .iter()
                .map(|item| self.bool_of(name, position, item))
                .collect(),
            _ => Err(type_mismatch(name, position, "an array of Booleans")),
        }
    }

    fn int_array_of(
        &self,
        name: &str,
        position: usize,
        arg: &ResolvedArg,
    ) -> Result<Vec<IntTerm>, EngineError> {
        match arg {
            ResolvedArg::Array { items, .. } => items
                .iter()
                .map(|item| self.int_of(name, position, item))
                .collect(),
            _ => Err(type_mismatch(name, position, "an array of integers")),
        }
    }

    /// Forbid every value pair of `a` and `b` for which `holds` is false
    fn post_relation(&mut self, a: &IntTerm, b: &IntTerm, holds: fn(i64, i64) -> bool) {
        for (va, la) in a.options() {
            for (vb, lb) in b.options() {
                if !holds(va, vb) {
                    let clause: Vec<BoolTerm> =
                        [la, lb].iter().flatten().map(|&lit| BoolTerm::Lit(-lit)).collect();
                    self.add_terms(&clause);
                }
            }
        }
    }

    /// `r` holds exactly when `holds(a, b)` does
    fn post_reified(&mut self, a: &IntTerm, b: &IntTerm, r: BoolTerm, holds: fn(i64, i64) -> bool) {
        for (va, la) in a.options() {
            for (vb, lb) in b.options() {
                let mut clause: Vec<BoolTerm> =
                    [la, lb].iter().flatten().map(|&lit| BoolTerm::Lit(-lit)).collect();
                clause.push(if holds(va, vb) { r } else { !r });
                self.add_terms(&clause);
            }
        }
    }

    /// `r` holds exactly when all of `terms` do
    fn post_conjunction(&mut self, terms: &[BoolTerm], r: BoolTerm) {
        for &term in terms {
            self.add_terms(&[!r, term]);
        }
        let mut clause: Vec<BoolTerm> = terms.iter().map(|&term| !term).collect();
        clause.push(r);
        self.add_terms(&clause);
    }

    /// `r` holds exactly when one of `terms` does
    fn post_disjunction(&mut self, terms: &[BoolTerm], r: BoolTerm) {
        for &term in terms {
            self.add_terms(&[!term, r]);
        }
        let mut clause = terms.to_vec();
        clause.push(!r);
        self.add_terms(&clause);
    }

    fn term_value(&self, term: &IntTerm) -> Option<i64> {
        match term {
            IntTerm::Const(value) => Some(*value),
            IntTerm::Var(encoding) => encoding
                .iter()
                .find(|&&(_, lit)| self.solver.value(lit) == Some(true))
                .map(|&(value, _)| value),
        }
    }

    fn extract_solution(&self) -> Solution {
        let mut solution = Solution::default();
        for id in &self.order {
            if let Some(&lit) = self.bools.get(id) {
                let value = self.solver.value(lit).unwrap_or(false);
                solution.values.insert(*id, Value::Bool(value));
            } else if let Some(encoding) = self.ints.get(id) {
                let chosen = encoding
                    .iter()
                    .find(|&&(_, lit)| self.solver.value(lit) == Some(true));
                if let Some(&(value, _)) = chosen {
                    solution.values.insert(*id, Value::Int(value));
                }
            }
        }
        solution
    }

    /// Clause excluding exactly the given assignment
    fn blocking_clause(&self, solution: &Solution) -> Clause {
        let mut literals = Vec::new();
        for id in &self.order {
            match (solution.get(*id), self.bools.get(id), self.ints.get(id)) {
                (Some(Value::Bool(value)), Some(&lit), _) => {
                    literals.push(if value { -lit } else { lit });
                }
                (Some(Value::Int(value)), _, Some(encoding)) => {
                    if let Some(&(_, lit)) = encoding.iter().find(|&&(v, _)| v == value) {
                        literals.push(-lit);
                    }
                }
                _ => {}
            }
        }
        Clause::new(literals)
    }

    fn enumerate(&mut self) -> SolveOutcome {
        let mut outcome = SolveOutcome::default();
        loop {
            if let Some(limit) = self.options.solution_limit {
                if outcome.solutions.len() >= limit {
                    break;
                }
            }

            match self.solver.solve() {
                Some(true) => {
                    let solution = self.extract_solution();
                    let blocking = self.blocking_clause(&solution);
                    outcome.solutions.push(solution);
                    if blocking.is_empty() {
                        outcome.complete = true;
                        break;
                    }
                    self.add_clause(blocking);
                }
                Some(false) => {
                    outcome.complete = true;
                    break;
                }
                None => break,
            }
        }
        outcome
    }

    /// Report every improving solution; the last one is optimal when complete
    fn optimize(&mut self, target: &ResolvedArg, minimize: bool) -> Result<SolveOutcome, EngineError> {
        let term = self.int_of("objective", 0, target)?;
        let mut outcome = SolveOutcome::default();

        loop {
            match self.solver.solve() {
                Some(true) => {
                    let solution = self.extract_solution();
                    let Some(best) = self.term_value(&term) else {
                        break;
                    };
                    outcome.solutions.push(solution);
                    info!(objective = best, "found improving solution");

                    let IntTerm::Var(encoding) = &term else {
                        outcome.complete = true;
                        break;
                    };
                    let not_better: Vec<i32> = encoding
                        .iter()
                        .filter(|&&(value, _)| if minimize { value >= best } else { value <= best })
                        .map(|&(_, lit)| lit)
                        .collect();
                    for lit in not_better {
                        self.add_clause(Clause::unit(-lit));
                    }
                }
                Some(false) => {
                    outcome.complete = true;
                    break;
                }
                None => break,
            }
        }
        Ok(outcome)
    }
}

impl Engine for SatEngine {
    fn declare_variable(&mut self, decl: &VariableDecl) -> Result<(), EngineError> {
        match decl {
            VariableDecl::Int { id, domain } => {
                let size = domain.size();
                if size > self.options.max_domain_size {
                    return Err(EngineError::DomainTooLarge {
                        id: *id,
                        size,
                        limit: self.options.max_domain_size,
                    });
                }
                let mut encoding = Vec::with_capacity(size as usize);
                for value in domain.values() {
                    encoding.push((value, self.new_var()));
                }
                let literals: Vec<i32> = encoding.iter().map(|&(_, lit)| lit).collect();
                for clause in exactly_one(&literals) {
                    self.add_clause(clause);
                }
                self.ints.insert(*id, encoding);
                self.order.push(*id);
            }
            VariableDecl::Bool { id, fixed } => {
                let lit = self.new_var();
                let clause = match fixed {
                    Some(true) => Clause::unit(lit),
                    Some(false) => Clause::unit(-lit),
                    // tautology, registers the variable with the solver
                    None => Clause::binary(lit, -lit),
                };
                self.add_clause(clause);
                self.bools.insert(*id, lit);
                self.order.push(*id);
            }
            VariableDecl::Set { index } => {
                debug!(index, "set variable has no SAT encoding, ignored");
            }
        }
        Ok(())
    }

    fn post_constraint(&mut self, constraint: &ResolvedConstraint) -> Result<(), EngineError> {
        let name = constraint.name.as_str();
        let args = &constraint.args;

        match name {
            "bool_clause" => {
                check_arity(constraint, 2)?;
                let positive = self.bool_array_of(name, 0, &args[0])?;
                let negative = self.bool_array_of(name, 1, &args[1])?;
                let terms: Vec<BoolTerm> = positive
                    .into_iter()
                    .chain(negative.into_iter().map(|term| !term))
                    .collect();
                self.add_terms(&terms);
            }
            "bool_eq" | "bool_not" | "bool_le" | "bool_lt" => {
                check_arity(constraint, 2)?;
                let a = self.bool_of(name, 0, &args[0])?;
                let b = self.bool_of(name, 1, &args[1])?;
                match name {
                    "bool_eq" => {
                        self.add_terms(&[!a, b]);
                        self.add_terms(&[a, !b]);
                    }
                    "bool_not" => {
                        self.add_terms(&[a, b]);
                        self.add_terms(&[!a, !b]);
                    }
                    "bool_le" => self.add_terms(&[!a, b]),
                    _ => {
                        self.add_terms(&[!a]);
                        self.add_terms(&[b]);
                    }
                }
            }
            "bool_and" | "bool_or" | "bool_xor" => {
                check_arity(constraint, 3)?;
                let a = self.bool_of(name, 0, &args[0])?;
                let b = self.bool_of(name, 1, &args[1])?;
                let r = self.bool_of(name, 2, &args[2])?;
                match name {
                    "bool_and" => self.post_conjunction(&[a, b], r),
                    "bool_or" => self.post_disjunction(&[a, b], r),
                    _ => {
                        self.add_terms(&[!r, a, b]);
                        self.add_terms(&[!r, !a, !b]);
                        self.add_terms(&[r, !a, b]);
                        self.add_terms(&[r, a, !b]);
                    }
                }
            }
            "array_bool_and" | "array_bool_or" => {
                check_arity(constraint, 2)?;
                let terms = self.bool_array_of(name, 0, &args[0])?;
                let r = self.bool_of(name, 1, &args[1])?;
                if name == "array_bool_and" {
                    self.post_conjunction(&terms, r);
                } else {
                    self.post_disjunction(&terms, r);
                }
            }
            "bool2int" => {
                check_arity(constraint, 2)?;
                let b = self.int_of(name, 0, &args[0])?;
                let i = self.int_of(name, 1, &args[1])?;
                self.post_relation(&b, &i, |a, b| a == b);
            }
            "int_eq" | "int_ne" | "int_le" | "int_lt" => {
                check_arity(constraint, 2)?;
                let a = self.int_of(name, 0, &args[0])?;
                let b = self.int_of(name, 1, &args[1])?;
                if let Some(holds) = int_relation(name) {
                    self.post_relation(&a, &b, holds);
                }
            }
            "int_eq_reif" | "int_ne_reif" | "int_le_reif" | "int_lt_reif" => {
                check_arity(constraint, 3)?;
                let a = self.int_of(name, 0, &args[0])?;
                let b = self.int_of(name, 1, &args[1])?;
                let r = self.bool_of(name, 2, &args[2])?;
                if let Some(holds) = int_relation(name.trim_end_matches("_reif")) {
                    self.post_reified(&a, &b, r, holds);
                }
            }
            "all_different_int" | "fzn_all_different_int" => {
                check_arity(constraint, 1)?;
                let terms = self.int_array_of(name, 0, &args[0])?;
                for (a, b) in terms.iter().tuple_combinations() {
                    self.post_relation(a, b, |x, y| x != y);
                }
            }
            _ => return Err(EngineError::Unsupported(constraint.name.clone())),
        }
        Ok(())
    }

    fn set_objective(&mut self, objective: &Objective) -> Result<(), EngineError> {
        self.objective = objective.clone();
        Ok(())
    }

    fn configure_search(&mut self, config: &SearchConfig) -> Result<(), EngineError> {
        debug!(
            branchings = config.branchings.len(),
            restart = ?config.restart,
            "search configuration recorded; CaDiCaL uses its own heuristics"
        );
        self.search = Some(config.clone());
        Ok(())
    }

    fn solve(&mut self) -> Result<SolveOutcome, EngineError> {
        debug!(
            variables = self.variable_count(),
            clauses = self.clause_count,
            "starting SAT search"
        );
        if self.infeasible {
            return Ok(SolveOutcome {
                solutions: Vec::new(),
                complete: true,
            });
        }

        match self.objective.clone() {
            Objective::Satisfy => Ok(self.enumerate()),
            Objective::Minimize(target) => self.optimize(&target, true),
            Objective::Maximize(target) => self.optimize(&target, false),
        }
    }

    fn name(&self) -> &'static str {
        "sat"
    }
}
