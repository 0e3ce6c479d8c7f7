//! Engine that only records what it is handed

use super::gateway::{
    Engine, EngineError, Objective, ResolvedConstraint, Solution, SolveOutcome, Value,
    VariableDecl,
};
use crate::search::SearchConfig;
use std::collections::HashSet;

/// Keeps every declaration, constraint, objective and search configuration.
///
/// `solve` reports the single solution of a model whose variables are all
/// fixed, and no solution otherwise.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    variables: Vec<VariableDecl>,
    constraints: Vec<ResolvedConstraint>,
    objective: Option<Objective>,
    search: Option<SearchConfig>,
    rejected: HashSet<String>,
    solve_calls: usize,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine that refuses the named constraints
    pub fn rejecting<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rejected: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn variables(&self) -> &[VariableDecl] {
        &self.variables
    }

    pub fn constraints(&self) -> &[ResolvedConstraint] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    pub fn search(&self) -> Option<&SearchConfig> {
        self.search.as_ref()
    }

    pub fn solve_calls(&self) -> usize {
        self.solve_calls
    }

    fn fixed_solution(&self) -> Option<Solution> {
        let mut solution = Solution::default();
        for decl in &self.variables {
            match decl {
                VariableDecl::Int { id, domain } => {
                    solution.values.insert(*id, Value::Int(domain.fixed_value()?));
                }
                VariableDecl::Bool { id, fixed } => {
                    solution.values.insert(*id, Value::Bool((*fixed)?));
                }
                VariableDecl::Set { .. } => return None,
            }
        }
        Some(solution)
    }
}

impl Engine for RecordingEngine {
    fn declare_variable(&mut self, decl: &VariableDecl) -> Result<(), EngineError> {
        self.variables.push(decl.clone());
        Ok(())
    }

    fn post_constraint(&mut self, constraint: &ResolvedConstraint) -> Result<(), EngineError> {
        if self.rejected.contains(&constraint.name) {
            return Err(EngineError::Unsupported(constraint.name.clone()));
        }
        self.constraints.push(constraint.clone());
        Ok(())
    }

    fn set_objective(&mut self, objective: &Objective) -> Result<(), EngineError> {
        self.objective = Some(objective.clone());
        Ok(())
    }

    fn configure_search(&mut self, config: &SearchConfig) -> Result<(), EngineError> {
        self.search = Some(config.clone());
        Ok(())
    }

    fn solve(&mut self) -> Result<SolveOutcome, EngineError> {
        self.solve_calls += 1;
        Ok(match self.fixed_solution() {
            Some(solution) => SolveOutcome {
                solutions: vec![solution],
                complete: true,
            },
            None => SolveOutcome::default(),
        })
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Domain, TheoryId};

    #[test]
    fn test_fixed_model_yields_one_solution() {
        let mut engine = RecordingEngine::new();
        let x = TheoryId::FIRST_FREE;
        engine
            .declare_variable(&VariableDecl::Int {
                id: x,
                domain: Domain::singleton(4),
            })
            .unwrap();

        let outcome = engine.solve().unwrap();

        assert!(outcome.complete);
        assert_eq!(outcome.solutions.len(), 1);
        assert_eq!(outcome.solutions[0].get(x), Some(Value::Int(4)));
    }

    #[test]
    fn test_open_model_yields_nothing() {
        let mut engine = RecordingEngine::new();
        engine
            .declare_variable(&VariableDecl::Bool {
                id: TheoryId::FIRST_FREE,
                fixed: None,
            })
            .unwrap();

        let outcome = engine.solve().unwrap();

        assert!(outcome.solutions.is_empty());
        assert!(!outcome.complete);
        assert_eq!(engine.solve_calls(), 1);
    }
}
