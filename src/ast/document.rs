//! Serialized form of a parsed model, as loaded by the binary

use super::node::{ConExpr, Node, SetLit};
use super::spec::{BoolVarSpec, IntVarSpec, SetVarSpec};
use crate::engine::Engine;
use crate::model::{Model, ModelResult};
use crate::output::Printer;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// A variable specification together with its source name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declared<S> {
    pub name: String,
    #[serde(flatten)]
    pub spec: S,
}

impl<S> Declared<S> {
    pub fn new(name: impl Into<String>, spec: S) -> Self {
        Self {
            name: name.into(),
            spec,
        }
    }
}

/// Boolean variable `bool_var` stands in for integer variable `int_var`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoolAlias {
    pub int_var: usize,
    pub bool_var: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintItem {
    #[serde(flatten)]
    pub expr: ConExpr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SolveGoal {
    Satisfy,
    Minimize { var: usize },
    Maximize { var: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveItem {
    #[serde(flatten)]
    pub goal: SolveGoal,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Node>,
}

impl Default for SolveItem {
    fn default() -> Self {
        Self {
            goal: SolveGoal::Satisfy,
            annotations: Vec::new(),
        }
    }
}

/// Everything the front end extracted from a model file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelDocument {
    pub int_vars: Vec<Declared<IntVarSpec>>,
    pub bool_vars: Vec<Declared<BoolVarSpec>>,
    pub set_vars: Vec<Declared<SetVarSpec>>,
    pub bool_aliases: Vec<BoolAlias>,
    pub constraints: Vec<ConstraintItem>,
    pub solve: SolveItem,
    pub output: Vec<Node>,
}

impl ModelDocument {
    /// Load a document, as YAML for `.yaml`/`.yml` files and JSON otherwise
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model file: {}", path.display()))?;

        let document = if is_yaml(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse model file: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse model file: {}", path.display()))?
        };
        Ok(document)
    }

    /// Save as pretty JSON, which the YAML loader reads as well
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize model")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write model file: {}", path.display()))?;
        Ok(())
    }

    /// Declare, constrain and set the goal of `model`, in that order
    pub fn build<E: Engine>(&self, model: &mut Model<E>) -> ModelResult<()> {
        model.init(self.int_vars.len(), self.bool_vars.len(), self.set_vars.len())?;

        for var in &self.int_vars {
            model.new_int_var(&var.spec, &var.name)?;
        }
        for var in &self.bool_vars {
            model.new_bool_var(&var.spec, &var.name)?;
        }
        for var in &self.set_vars {
            model.new_set_var(&var.spec)?;
        }
        for alias in &self.bool_aliases {
            model.alias_bool_to_int(alias.int_var, alias.bool_var)?;
        }
        for item in &self.constraints {
            model.post_constraint(&item.expr, item.annotation.as_ref())?;
        }
        debug!(constraints = self.constraints.len(), "model document loaded");

        let annotations = self.solve.annotations.clone();
        match self.solve.goal {
            SolveGoal::Satisfy => model.solve(annotations),
            SolveGoal::Minimize { var } => model.minimize(var, annotations),
            SolveGoal::Maximize { var } => model.maximize(var, annotations),
        }
    }

    pub fn printer(&self) -> Printer {
        Printer::new(self.output.clone())
    }

    /// Three ordered, pairwise different digits
    pub fn example() -> Self {
        let digit = IntVarSpec::with_domain(SetLit::Range { lo: 1, hi: 3 });
        let names = ["x", "y", "z"];

        let mut output = Vec::new();
        for (index, name) in names.iter().enumerate() {
            output.push(Node::Str(format!("{} = ", name)));
            output.push(Node::IntVar(index));
            output.push(Node::Str(";\n".to_string()));
        }

        Self {
            int_vars: names
                .iter()
                .map(|name| Declared::new(*name, digit.clone()))
                .collect(),
            constraints: vec![
                ConstraintItem {
                    expr: ConExpr::new(
                        "all_different_int",
                        vec![Node::Array(vec![Node::IntVar(0), Node::IntVar(1), Node::IntVar(2)])],
                    ),
                    annotation: None,
                },
                ConstraintItem {
                    expr: ConExpr::new("int_lt", vec![Node::IntVar(0), Node::IntVar(1)]),
                    annotation: None,
                },
                ConstraintItem {
                    expr: ConExpr::new("int_lt", vec![Node::IntVar(1), Node::IntVar(2)]),
                    annotation: None,
                },
            ],
            solve: SolveItem {
                goal: SolveGoal::Satisfy,
                annotations: vec![Node::call(
                    "int_search",
                    vec![
                        Node::Array(vec![Node::IntVar(0), Node::IntVar(1), Node::IntVar(2)]),
                        Node::atom("input_order"),
                        Node::atom("indomain_min"),
                        Node::atom("complete"),
                    ],
                )],
            },
            output,
            ..Self::default()
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Objective, RecordingEngine, VariableDecl};
    use crate::model::{Method, Phase};
    use tempfile::tempdir;

    const DOCUMENT: &str = r#"{
        "int_vars": [
            {"name": "x", "domain": {"values": [1, 2, 3]}},
            {"name": "y", "assigned": 5, "introduced": true}
        ],
        "bool_vars": [{"name": "b"}],
        "bool_aliases": [],
        "constraints": [
            {"id": "int_le", "args": [{"int_var": 0}, {"int": 2}], "annotation": {"atom": "domain"}}
        ],
        "solve": {"method": "maximize", "var": 0, "annotations": [{"atom": "restart_none"}]},
        "output": [{"str": "x = "}, {"int_var": 0}, {"str": ";\n"}]
    }"#;

    #[test]
    fn test_parse_json_document() {
        let document: ModelDocument = serde_json::from_str(DOCUMENT).unwrap();

        assert_eq!(document.int_vars[0].name, "x");
        assert_eq!(document.int_vars[0].spec.domain, Some(SetLit::Values(vec![1, 2, 3])));
        assert_eq!(document.int_vars[1].spec, IntVarSpec::assigned(5).introduced());
        assert_eq!(document.bool_vars[0].spec, BoolVarSpec::default());
        assert_eq!(document.constraints[0].expr.id, "int_le");
        assert_eq!(document.constraints[0].annotation, Some(Node::atom("domain")));
        assert_eq!(document.solve.goal, SolveGoal::Maximize { var: 0 });
        assert_eq!(document.output.len(), 3);
    }

    #[test]
    fn test_missing_sections_default() {
        let document: ModelDocument = serde_json::from_str("{}").unwrap();

        assert!(document.int_vars.is_empty());
        assert_eq!(document.solve, SolveItem::default());
        assert!(document.printer().is_empty());
    }

    #[test]
    fn test_build_drives_model() {
        let document: ModelDocument = serde_json::from_str(DOCUMENT).unwrap();
        let mut model = Model::new(RecordingEngine::new());

        document.build(&mut model).unwrap();

        assert_eq!(model.phase(), Phase::GoalSet);
        assert_eq!(model.method(), Some(Method::Maximize));
        assert_eq!(model.opt_var(), Some(0));
        assert_eq!(model.solve_annotations(), &[Node::atom("restart_none")]);
        assert!(model.variables().int_introduced(1));

        let engine = model.engine();
        assert_eq!(engine.variables().len(), 3);
        assert!(matches!(engine.variables()[2], VariableDecl::Bool { fixed: None, .. }));
        assert_eq!(engine.constraints().len(), 1);
        assert!(matches!(engine.objective(), Some(Objective::Maximize(_))));
    }

    #[test]
    fn test_build_reports_bad_reference() {
        let mut document = ModelDocument::example();
        document.constraints.push(ConstraintItem {
            expr: ConExpr::new("int_ne", vec![Node::IntVar(0), Node::IntVar(3)]),
            annotation: None,
        });

        let mut model = Model::new(RecordingEngine::new());
        assert!(document.build(&mut model).is_err());
        assert_eq!(model.method(), None);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("models/example.json");

        let document = ModelDocument::example();
        document.to_file(&path).unwrap();
        let loaded = ModelDocument::from_file(&path).unwrap();

        assert_eq!(loaded, document);
    }

    #[test]
    fn test_load_yaml_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.yml");
        std::fs::write(
            &path,
            r#"
int_vars:
  - name: x
    domain:
      range: {lo: 0, hi: 4}
constraints:
  - id: int_ne
    args:
      - int_var: 0
      - int: 2
solve:
  method: minimize
  var: 0
output:
  - str: "x = "
  - int_var: 0
"#,
        )
        .unwrap();

        let document = ModelDocument::from_file(&path).unwrap();

        assert_eq!(document.int_vars[0].spec.domain, Some(SetLit::Range { lo: 0, hi: 4 }));
        assert_eq!(document.constraints[0].expr.args, vec![Node::IntVar(0), Node::Int(2)]);
        assert_eq!(document.solve.goal, SolveGoal::Minimize { var: 0 });
        assert_eq!(document.output[1], Node::IntVar(0));
    }

    #[test]
    fn test_unreadable_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ModelDocument::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse model file"));
    }
}
