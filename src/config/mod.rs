//! Configuration management for the model builder

pub mod settings;

pub use settings::{CliOverrides, OutputConfig, SearchSettings, Settings, SolverBackend, SolverConfig};
