//! Configuration settings for the model builder and its engines

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub solver: SolverConfig,
    pub search: SearchSettings,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    /// Solutions to report for satisfaction problems
    pub max_solutions: usize,
    /// Report every solution, ignoring `max_solutions`
    pub all_solutions: bool,
    /// Largest integer domain the SAT backend will encode
    pub max_domain_size: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    Sat,
    Recording,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Skip unknown search annotations silently instead of warning
    pub ignore_unknown_annotations: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Append model statistics as comment lines after the solutions
    pub print_statistics: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::Sat,
            max_solutions: 1,
            all_solutions: false,
            max_domain_size: 256,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            ignore_unknown_annotations: true,
        }
    }
}

impl SolverConfig {
    /// Solution cap for satisfaction search; `None` means no cap
    pub fn solution_limit(&self) -> Option<usize> {
        if self.all_solutions {
            None
        } else {
            Some(self.max_solutions)
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.solver.all_solutions && self.solver.max_solutions == 0 {
            anyhow::bail!("Maximum solutions must be positive (use all_solutions for no limit)");
        }

        if self.solver.max_domain_size == 0 {
            anyhow::bail!("Maximum domain size must be positive");
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(backend) = cli_overrides.backend {
            self.solver.backend = backend;
        }
        if let Some(max_solutions) = cli_overrides.max_solutions {
            self.solver.max_solutions = max_solutions;
        }
        if cli_overrides.all_solutions {
            self.solver.all_solutions = true;
        }
        if cli_overrides.strict {
            self.search.ignore_unknown_annotations = false;
        }
        if cli_overrides.statistics {
            self.output.print_statistics = true;
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub backend: Option<SolverBackend>,
    pub max_solutions: Option<usize>,
    pub all_solutions: bool,
    pub strict: bool,
    pub statistics: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.solver.backend, SolverBackend::Sat);
        assert_eq!(settings.solver.solution_limit(), Some(1));
        assert!(settings.search.ignore_unknown_annotations);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config/default.yaml");

        let mut settings = Settings::default();
        settings.solver.max_solutions = 7;
        settings.solver.backend = SolverBackend::Recording;
        settings.to_file(&path).unwrap();

        let loaded = Settings::from_file(&path).unwrap();
        assert_eq!(loaded.solver.max_solutions, 7);
        assert_eq!(loaded.solver.backend, SolverBackend::Recording);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.yaml");
        std::fs::write(&path, "search:\n  ignore_unknown_annotations: false\n").unwrap();

        let loaded = Settings::from_file(&path).unwrap();

        assert!(!loaded.search.ignore_unknown_annotations);
        assert_eq!(loaded.solver.max_domain_size, 256);
    }

    #[test]
    fn test_validation_rejects_zero_limit() {
        let mut settings = Settings::default();
        settings.solver.max_solutions = 0;
        assert!(settings.validate().is_err());

        settings.solver.all_solutions = true;
        assert!(settings.validate().is_ok());
        assert_eq!(settings.solver.solution_limit(), None);
    }

    #[test]
    fn test_cli_overrides() {
        let mut settings = Settings::default();
        settings.merge_with_cli(&CliOverrides {
            backend: Some(SolverBackend::Recording),
            max_solutions: Some(3),
            all_solutions: false,
            strict: true,
            statistics: true,
        });

        assert_eq!(settings.solver.backend, SolverBackend::Recording);
        assert_eq!(settings.solver.max_solutions, 3);
        assert!(!settings.search.ignore_unknown_annotations);
        assert!(settings.output.print_statistics);
    }
}
