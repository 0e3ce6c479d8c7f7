//! Factory for creating engine instances based on configuration

use super::gateway::{
    Engine, EngineError, Objective, ResolvedConstraint, SolveOutcome, VariableDecl,
};
use super::recording::RecordingEngine;
use super::sat_engine::{SatEngine, SatOptions};
use crate::config::{SolverBackend, SolverConfig};
use crate::search::SearchConfig;

/// Engine interface over the available backends
pub enum UnifiedEngine {
    Sat(SatEngine),
    Recording(RecordingEngine),
}

impl UnifiedEngine {
    /// Create an engine for the configured backend
    pub fn new(config: &SolverConfig) -> Self {
        match config.backend {
            SolverBackend::Sat => UnifiedEngine::Sat(SatEngine::new(SatOptions {
                solution_limit: config.solution_limit(),
                max_domain_size: config.max_domain_size,
            })),
            SolverBackend::Recording => UnifiedEngine::Recording(RecordingEngine::new()),
        }
    }

    pub fn backend(&self) -> SolverBackend {
        match self {
            UnifiedEngine::Sat(_) => SolverBackend::Sat,
            UnifiedEngine::Recording(_) => SolverBackend::Recording,
        }
    }

    fn inner(&mut self) -> &mut dyn Engine {
        match self {
            UnifiedEngine::Sat(engine) => engine,
            UnifiedEngine::Recording(engine) => engine,
        }
    }
}

impl Engine for UnifiedEngine {
    fn declare_variable(&mut self, decl: &VariableDecl) -> Result<(), EngineError> {
        self.inner().declare_variable(decl)
    }

    fn post_constraint(&mut self, constraint: &ResolvedConstraint) -> Result<(), EngineError> {
        self.inner().post_constraint(constraint)
    }

    fn set_objective(&mut self, objective: &Objective) -> Result<(), EngineError> {
        self.inner().set_objective(objective)
    }

    fn configure_search(&mut self, config: &SearchConfig) -> Result<(), EngineError> {
        self.inner().configure_search(config)
    }

    fn solve(&mut self) -> Result<SolveOutcome, EngineError> {
        self.inner().solve()
    }

    fn name(&self) -> &'static str {
        match self {
            UnifiedEngine::Sat(engine) => engine.name(),
            UnifiedEngine::Recording(engine) => engine.name(),
        }
    }
}

impl Default for UnifiedEngine {
    fn default() -> Self {
        Self::new(&SolverConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sat_engine_creation() {
        let engine = UnifiedEngine::default();
        assert_eq!(engine.backend(), SolverBackend::Sat);
        assert_eq!(engine.name(), "sat");
    }

    #[test]
    fn test_recording_engine_creation() {
        let config = SolverConfig {
            backend: SolverBackend::Recording,
            ..SolverConfig::default()
        };
        let mut engine = UnifiedEngine::new(&config);

        assert_eq!(engine.backend(), SolverBackend::Recording);
        let outcome = engine.solve().unwrap();
        assert!(outcome.solutions.len() == 1 && outcome.complete);
    }
}
