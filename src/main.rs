//! Command line front end for the FlatZinc theory model builder

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flatzinc_theory::{
    config::{CliOverrides, Settings, SolverBackend},
    solve_document,
    utils::{ColorOutput, SummaryFormatter},
    ModelDocument,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flatzinc_theory")]
#[command(about = "Build and solve FlatZinc models through a theory engine")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a model document (JSON, or YAML by extension)
    Solve {
        /// Model document to solve
        document: PathBuf,

        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Report every solution
        #[arg(short, long)]
        all: bool,

        /// Maximum solutions to report (overrides config)
        #[arg(short = 'n', long)]
        max_solutions: Option<usize>,

        /// Warn about search annotations that are not understood
        #[arg(long)]
        strict: bool,

        /// Engine backend (overrides config)
        #[arg(short, long, value_enum)]
        backend: Option<SolverBackend>,

        /// Print model statistics after the solutions
        #[arg(short, long)]
        statistics: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Create a default configuration and an example model
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            document,
            config,
            all,
            max_solutions,
            strict,
            backend,
            statistics,
            verbose,
        } => {
            init_tracing(verbose);
            let overrides = CliOverrides {
                backend,
                max_solutions,
                all_solutions: all,
                strict,
                statistics,
            };
            solve_command(&document, &config, &overrides)
        }
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or progress with `--verbose`
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "flatzinc_theory=info"
    } else {
        "flatzinc_theory=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn solve_command(document_path: &Path, config_path: &Path, overrides: &CliOverrides) -> Result<()> {
    let mut settings = if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        tracing::debug!(path = %config_path.display(), "config file not found, using defaults");
        Settings::default()
    };
    settings.merge_with_cli(overrides);
    settings.validate().context("Configuration validation failed")?;

    let document = ModelDocument::from_file(document_path)
        .with_context(|| format!("Failed to load model from {}", document_path.display()))?;

    let start_time = Instant::now();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let stderr = std::io::stderr();
    let mut diagnostics = stderr.lock();

    let summary = solve_document(&document, &settings, &mut out, &mut diagnostics)?;
    out.flush()?;

    let status = SummaryFormatter::format_summary(&summary, start_time.elapsed().as_secs_f64());
    let status = if summary.solutions > 0 {
        ColorOutput::success(&status)
    } else {
        ColorOutput::warning(&status)
    };
    writeln!(diagnostics, "{}", status)?;

    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_dir = directory.join("config");
    let models_dir = directory.join("models");

    for dir in [&config_dir, &models_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    let model_path = models_dir.join("example.json");
    if !model_path.exists() || force {
        ModelDocument::example()
            .to_file(&model_path)
            .context("Failed to create example model")?;
        println!("Created: {}", model_path.display());
    } else {
        println!("Skipped: {} (already exists)", model_path.display());
    }

    let examples_dir = config_dir.join("examples");
    std::fs::create_dir_all(&examples_dir)?;

    let mut all_solutions = Settings::default();
    all_solutions.solver.all_solutions = true;
    all_solutions.output.print_statistics = true;
    all_solutions.to_file(&examples_dir.join("all_solutions.yaml"))?;

    let mut dry_run = Settings::default();
    dry_run.solver.backend = SolverBackend::Recording;
    dry_run.search.ignore_unknown_annotations = false;
    dry_run.to_file(&examples_dir.join("dry_run.yaml"))?;

    println!("Created example configurations in: {}", examples_dir.display());

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Run: cargo run -- solve {}", model_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "flatzinc_theory",
            "solve",
            "model.json",
            "--config",
            "test.yaml",
            "--backend",
            "recording",
            "-n",
            "5",
        ]);

        match cli.map(|cli| cli.command) {
            Ok(Commands::Solve {
                backend,
                max_solutions,
                all,
                ..
            }) => {
                assert_eq!(backend, Some(SolverBackend::Recording));
                assert_eq!(max_solutions, Some(5));
                assert!(!all);
            }
            _ => panic!("solve command did not parse"),
        }
    }

    #[test]
    fn test_solve_requires_document() {
        assert!(Cli::try_parse_from(["flatzinc_theory", "solve"]).is_err());
    }

    #[test]
    fn test_setup_command() {
        let temp_dir = tempdir().unwrap();
        let result = setup_command(temp_dir.path().to_path_buf(), false);

        assert!(result.is_ok());
        assert!(temp_dir.path().join("config/default.yaml").exists());
        assert!(temp_dir.path().join("config/examples/dry_run.yaml").exists());

        let model = ModelDocument::from_file(&temp_dir.path().join("models/example.json")).unwrap();
        assert_eq!(model, ModelDocument::example());
    }

    #[test]
    fn test_solve_command_on_example() {
        let temp_dir = tempdir().unwrap();
        setup_command(temp_dir.path().to_path_buf(), false).unwrap();

        let result = solve_command(
            &temp_dir.path().join("models/example.json"),
            &temp_dir.path().join("config/default.yaml"),
            &CliOverrides::default(),
        );

        assert!(result.is_ok());
    }
}
