//! Solving engines and the gateway that hands them the resolved model

pub mod clauses;
pub mod engine_factory;
pub mod gateway;
pub mod recording;
pub mod sat_engine;

pub use engine_factory::UnifiedEngine;
pub use gateway::{
    Engine, EngineError, Gateway, Objective, ResolvedArg, ResolvedConstraint, Solution,
    SolveOutcome, Value, VariableDecl,
};
pub use recording::RecordingEngine;
pub use sat_engine::{SatEngine, SatOptions};
