//! FlatZinc theory model builder
//!
//! This library takes a parsed FlatZinc model, assigns theory ids to its
//! symbols, constants and variables, and hands the resolved model to a
//! solving engine.

pub mod ast;
pub mod config;
pub mod engine;
pub mod model;
pub mod output;
pub mod search;
pub mod utils;

pub use ast::ModelDocument;
pub use config::Settings;
pub use engine::{Engine, UnifiedEngine};
pub use model::{Model, ModelError, ModelResult, RunSummary, TheoryId};
pub use output::Printer;

use anyhow::{Context, Result};
use std::io::Write;
use utils::SummaryFormatter;

/// Main entry point: build `document`, solve it with the configured engine
/// and print the solutions to `out`.
///
/// Warnings about ignored search annotations go to `diagnostics`.
pub fn solve_document(
    document: &ModelDocument,
    settings: &Settings,
    out: &mut dyn Write,
    diagnostics: &mut dyn Write,
) -> Result<RunSummary> {
    let mut model = Model::new(UnifiedEngine::new(&settings.solver));

    document.build(&mut model).context("Failed to build model")?;
    model
        .create_branchers(None, settings.search.ignore_unknown_annotations, diagnostics)
        .context("Failed to create search strategy")?;
    let summary = model
        .run(out, &document.printer())
        .context("Failed to solve model")?;

    if settings.output.print_statistics {
        write!(out, "{}", SummaryFormatter::format_statistics(&model.statistics()))?;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;
    use crate::config::SolverBackend;

    fn run(document: &ModelDocument, settings: &Settings) -> (RunSummary, String, String) {
        let mut out = Vec::new();
        let mut diagnostics = Vec::new();
        let summary = solve_document(document, settings, &mut out, &mut diagnostics).unwrap();
        (
            summary,
            String::from_utf8(out).unwrap(),
            String::from_utf8(diagnostics).unwrap(),
        )
    }

    #[test]
    fn test_example_solves_with_sat_backend() {
        let (summary, out, diagnostics) = run(&ModelDocument::example(), &Settings::default());

        assert_eq!(summary.solutions, 1);
        assert_eq!(out, "x = 1;\ny = 2;\nz = 3;\n----------\n");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_all_solutions_reports_completion() {
        let mut settings = Settings::default();
        settings.solver.all_solutions = true;
        settings.output.print_statistics = true;

        let (summary, out, _) = run(&ModelDocument::example(), &settings);

        assert!(summary.complete);
        assert!(out.contains("----------\n==========\n"));
        assert!(out.contains("%%   Integer variables: 3"));
    }

    #[test]
    fn test_strict_annotations_warn() {
        let mut document = ModelDocument::example();
        document.solve.annotations.push(Node::atom("warm_start"));
        let mut settings = Settings::default();
        settings.search.ignore_unknown_annotations = false;
        settings.solver.backend = SolverBackend::Recording;

        let (summary, out, diagnostics) = run(&document, &settings);

        assert_eq!(summary.solutions, 0);
        assert_eq!(out, "=====UNKNOWN=====\n");
        assert_eq!(diagnostics, "Warning, ignored search annotation: warm_start\n");
    }

    #[test]
    fn test_unsupported_constraint_is_an_error() {
        let mut document = ModelDocument::example();
        document.constraints.push(ast::ConstraintItem {
            expr: ast::ConExpr::new("int_times", vec![Node::IntVar(0), Node::IntVar(1), Node::IntVar(2)]),
            annotation: None,
        });

        let mut out = Vec::new();
        let err = solve_document(&document, &Settings::default(), &mut out, &mut std::io::sink()).unwrap_err();

        assert!(format!("{:#}", err).contains("int_times"));
    }
}
