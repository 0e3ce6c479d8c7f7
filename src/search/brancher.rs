//! Translation of solve-item annotations into search configuration

use crate::ast::Node;
use crate::model::{ModelResult, TheoryId, VarKind, VariableStore};
use std::collections::HashSet;
use std::io::Write;
use tracing::{debug, warn};

/// Order in which a branching picks its next variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarSelection {
    InputOrder,
    FirstFail,
    AntiFirstFail,
    Smallest,
    Largest,
    Occurrence,
    MostConstrained,
    MaxRegret,
    DomWDeg,
}

impl VarSelection {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "input_order" => VarSelection::InputOrder,
            "first_fail" => VarSelection::FirstFail,
            "anti_first_fail" => VarSelection::AntiFirstFail,
            "smallest" => VarSelection::Smallest,
            "largest" => VarSelection::Largest,
            "occurrence" => VarSelection::Occurrence,
            "most_constrained" => VarSelection::MostConstrained,
            "max_regret" => VarSelection::MaxRegret,
            "dom_w_deg" => VarSelection::DomWDeg,
            _ => return None,
        })
    }
}

/// Value tried first for the selected variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValSelection {
    IndomainMin,
    IndomainMax,
    IndomainMiddle,
    IndomainMedian,
    Indomain,
    IndomainRandom,
    IndomainSplit,
    IndomainReverseSplit,
    IndomainInterval,
}

impl ValSelection {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "indomain_min" => ValSelection::IndomainMin,
            "indomain_max" => ValSelection::IndomainMax,
            "indomain_middle" => ValSelection::IndomainMiddle,
            "indomain_median" => ValSelection::IndomainMedian,
            "indomain" => ValSelection::Indomain,
            "indomain_random" => ValSelection::IndomainRandom,
            "indomain_split" => ValSelection::IndomainSplit,
            "indomain_reverse_split" => ValSelection::IndomainReverseSplit,
            "indomain_interval" => ValSelection::IndomainInterval,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RestartPolicy {
    #[default]
    None,
    Constant {
        scale: i64,
    },
    Linear {
        scale: i64,
    },
    Geometric {
        base: f64,
        scale: i64,
    },
    Luby {
        scale: i64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Branching {
    pub kind: VarKind,
    pub vars: Vec<TheoryId>,
    pub var_selection: VarSelection,
    pub val_selection: ValSelection,
    /// Built from an annotation rather than added for uncovered variables
    pub from_annotation: bool,
}

/// Search configuration handed to the engine
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchConfig {
    pub branchings: Vec<Branching>,
    pub restart: RestartPolicy,
    /// Annotations (or parts of them) that were not understood
    pub ignored: usize,
}

/// Builds a [`SearchConfig`] from annotations.
///
/// Unknown annotations never fail the build: they are skipped, with a
/// warning on the diagnostics sink unless `ignore_unknown` is set.
pub struct BrancherBuilder<'a> {
    vars: &'a VariableStore,
    ignore_unknown: bool,
    diagnostics: &'a mut dyn Write,
    config: SearchConfig,
    covered: HashSet<TheoryId>,
}

impl<'a> BrancherBuilder<'a> {
    pub fn new(vars: &'a VariableStore, ignore_unknown: bool, diagnostics: &'a mut dyn Write) -> Self {
        Self {
            vars,
            ignore_unknown,
            diagnostics,
            config: SearchConfig::default(),
            covered: HashSet::new(),
        }
    }

    pub fn build(mut self, annotations: &[Node]) -> ModelResult<SearchConfig> {
        for annotation in annotations {
            self.apply(annotation)?;
        }
        self.add_default_branchings();
        debug!(
            branchings = self.config.branchings.len(),
            ignored = self.config.ignored,
            "search configuration built"
        );
        Ok(self.config)
    }

    fn apply(&mut self, annotation: &Node) -> ModelResult<()> {
        match annotation {
            Node::Array(items) => {
                for item in items {
                    self.apply(item)?;
                }
                Ok(())
            }
            Node::Atom(name) if name == "restart_none" => {
                self.config.restart = RestartPolicy::None;
                Ok(())
            }
            Node::Call { id, args } => match id.as_str() {
                "seq_search" => match args.first().and_then(Node::as_array) {
                    Some(items) if args.len() == 1 => {
                        for item in items {
                            self.apply(item)?;
                        }
                        Ok(())
                    }
                    _ => self.unknown(annotation),
                },
                "int_search" => self.search(VarKind::Int, annotation, args),
                "bool_search" => self.search(VarKind::Bool, annotation, args),
                "set_search" => self.search(VarKind::Set, annotation, args),
                "restart_constant" | "restart_linear" | "restart_luby" => {
                    match (args.len(), args.first().and_then(Node::as_int)) {
                        (1, Some(scale)) => {
                            self.config.restart = match id.as_str() {
                                "restart_constant" => RestartPolicy::Constant { scale },
                                "restart_linear" => RestartPolicy::Linear { scale },
                                _ => RestartPolicy::Luby { scale },
                            };
                            Ok(())
                        }
                        _ => self.unknown(annotation),
                    }
                }
                "restart_geometric" => {
                    let base = match args.first() {
                        Some(Node::Float(base)) => Some(*base),
                        Some(Node::Int(base)) => Some(*base as f64),
                        _ => None,
                    };
                    match (args.len(), base, args.get(1).and_then(Node::as_int)) {
                        (2, Some(base), Some(scale)) => {
                            self.config.restart = RestartPolicy::Geometric { base, scale };
                            Ok(())
                        }
                        _ => self.unknown(annotation),
                    }
                }
                _ => self.unknown(annotation),
            },
            _ => self.unknown(annotation),
        }
    }

    /// `*_search(vars, var_selection, value_selection[, strategy])`
    fn search(&mut self, kind: VarKind, annotation: &Node, args: &[Node]) -> ModelResult<()> {
        let items = match args.first().and_then(Node::as_array) {
            Some(items) if args.len() == 3 || args.len() == 4 => items,
            _ => return self.unknown(annotation),
        };

        let mut vars = Vec::with_capacity(items.len());
        for item in items {
            match (kind, item) {
                (VarKind::Int, Node::IntVar(index)) => vars.push(self.vars.int_id(*index)?),
                (VarKind::Bool, Node::BoolVar(index)) => vars.push(self.vars.bool_id(*index)?),
                (VarKind::Set, Node::SetVar(index)) => {
                    self.vars.set(*index)?;
                }
                // fixed entries of the variable array
                (_, Node::Int(_)) | (_, Node::Bool(_)) | (_, Node::Set(_)) => {}
                _ => return self.unknown(annotation),
            }
        }

        let var_selection = match args[1].head().and_then(VarSelection::from_name) {
            Some(selection) => selection,
            None => {
                self.unknown(&args[1])?;
                VarSelection::InputOrder
            }
        };
        let val_selection = match args[2].head().and_then(ValSelection::from_name) {
            Some(selection) => selection,
            None => {
                self.unknown(&args[2])?;
                ValSelection::IndomainMin
            }
        };

        if kind == VarKind::Set {
            debug!("set variables carry no theory ids, no branching emitted");
            return Ok(());
        }

        self.covered.extend(vars.iter().copied());
        self.config.branchings.push(Branching {
            kind,
            vars,
            var_selection,
            val_selection,
            from_annotation: true,
        });
        Ok(())
    }

    fn unknown(&mut self, annotation: &Node) -> ModelResult<()> {
        self.config.ignored += 1;
        if self.ignore_unknown {
            debug!(annotation = %annotation, "skipping unknown search annotation");
            return Ok(());
        }
        warn!(annotation = %annotation, "ignored search annotation");
        writeln!(self.diagnostics, "Warning, ignored search annotation: {}", annotation)?;
        Ok(())
    }

    /// Branch on every open variable no annotation mentioned: integers
    /// first, modeller-declared before introduced ones. An integer aliased
    /// to a Boolean is branched on through the Boolean.
    fn add_default_branchings(&mut self) {
        let ints: Vec<(TheoryId, bool)> = self
            .vars
            .ints()
            .iter()
            .enumerate()
            .filter(|(index, _)| self.vars.bool_alias(*index).is_none())
            .filter(|(_, var)| var.domain().fixed_value().is_none())
            .map(|(index, var)| (var.id(), self.vars.int_introduced(index)))
            .collect();
        let bools: Vec<(TheoryId, bool)> = self
            .vars
            .bools()
            .iter()
            .enumerate()
            .filter(|(_, var)| var.fixed().is_none())
            .map(|(index, var)| (var.id(), self.vars.bool_introduced(index)))
            .collect();

        self.push_default(VarKind::Int, &ints);
        self.push_default(VarKind::Bool, &bools);
    }

    fn push_default(&mut self, kind: VarKind, candidates: &[(TheoryId, bool)]) {
        for introduced in [false, true] {
            let vars: Vec<TheoryId> = candidates
                .iter()
                .filter(|(_, flag)| *flag == introduced)
                .map(|(id, _)| *id)
                .filter(|id| self.covered.insert(*id))
                .collect();
            if !vars.is_empty() {
                self.config.branchings.push(Branching {
                    kind,
                    vars,
                    var_selection: VarSelection::InputOrder,
                    val_selection: ValSelection::IndomainMin,
                    from_annotation: false,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BoolVarSpec, IntVarSpec, SetLit};
    use crate::model::{BooleanVariable, IdAllocator, IntegerVariable, ModelError};

    /// Three open integers (the last introduced) and one open Boolean
    fn store() -> VariableStore {
        let mut ids = IdAllocator::new();
        let mut store = VariableStore::sized(3, 1, 0);
        let spec = IntVarSpec::with_domain(SetLit::Range { lo: 1, hi: 3 });
        for (name, introduced) in [("x", false), ("y", false), ("tmp", true)] {
            let var = IntegerVariable::declare(&spec, name, ids.allocate()).unwrap();
            store.push_int(var, introduced).unwrap();
        }
        let b = BooleanVariable::declare(&BoolVarSpec::default(), "b", &mut ids);
        store.push_bool(b, false).unwrap();
        store
    }

    fn build(store: &VariableStore, annotations: &[Node], ignore_unknown: bool) -> (ModelResult<SearchConfig>, String) {
        let mut sink = Vec::new();
        let result = BrancherBuilder::new(store, ignore_unknown, &mut sink).build(annotations);
        (result, String::from_utf8(sink).unwrap())
    }

    fn int_search(vars: Vec<Node>, var_sel: &str, val_sel: &str) -> Node {
        Node::call(
            "int_search",
            vec![
                Node::Array(vars),
                Node::atom(var_sel),
                Node::atom(val_sel),
                Node::atom("complete"),
            ],
        )
    }

    #[test]
    fn test_no_annotations_gives_default_branchings() {
        let store = store();
        let (config, diagnostics) = build(&store, &[], false);
        let config = config.unwrap();

        assert!(diagnostics.is_empty());
        assert_eq!(config.branchings.len(), 3);
        assert_eq!(config.branchings[0].vars, vec![store.int_id(0).unwrap(), store.int_id(1).unwrap()]);
        assert_eq!(config.branchings[1].vars, vec![store.int_id(2).unwrap()]);
        assert_eq!(config.branchings[2].kind, VarKind::Bool);
        assert!(config.branchings.iter().all(|b| !b.from_annotation));
    }

    #[test]
    fn test_aliased_integer_has_no_default_branching() {
        let mut store = store();
        store.link_alias(0, 0).unwrap();
        let (config, _) = build(&store, &[], false);
        let config = config.unwrap();

        assert_eq!(config.branchings[0].vars, vec![store.int_id(1).unwrap()]);
        assert!(config
            .branchings
            .iter()
            .all(|b| !b.vars.contains(&store.int_id(0).unwrap())));
        let bools = config.branchings.iter().find(|b| b.kind == VarKind::Bool).unwrap();
        assert_eq!(bools.vars, vec![store.bool_id(0).unwrap()]);
    }

    #[test]
    fn test_int_search_is_applied_first() {
        let store = store();
        let ann = int_search(vec![Node::IntVar(1), Node::Int(4)], "first_fail", "indomain_max");
        let (config, _) = build(&store, &[ann], false);
        let config = config.unwrap();

        let first = &config.branchings[0];
        assert!(first.from_annotation);
        assert_eq!(first.vars, vec![store.int_id(1).unwrap()]);
        assert_eq!(first.var_selection, VarSelection::FirstFail);
        assert_eq!(first.val_selection, ValSelection::IndomainMax);
        // y is covered, so the default integer branching only has x
        assert_eq!(config.branchings[1].vars, vec![store.int_id(0).unwrap()]);
        assert_eq!(config.ignored, 0);
    }

    #[test]
    fn test_unknown_annotation_ignored_silently() {
        let store = store();
        let (config, diagnostics) = build(&store, &[Node::call("priority_search", vec![])], true);

        assert!(diagnostics.is_empty());
        assert_eq!(config.unwrap().ignored, 1);
    }

    #[test]
    fn test_unknown_annotation_warns_when_strict() {
        let store = store();
        let (config, diagnostics) = build(&store, &[Node::atom("fancy_search")], false);

        assert!(config.is_ok());
        assert_eq!(diagnostics, "Warning, ignored search annotation: fancy_search\n");
    }

    #[test]
    fn test_unknown_selection_degrades_to_default() {
        let store = store();
        let ann = int_search(vec![Node::IntVar(0)], "impact", "indomain_min");
        let (config, diagnostics) = build(&store, &[ann], false);
        let config = config.unwrap();

        assert_eq!(config.branchings[0].var_selection, VarSelection::InputOrder);
        assert!(diagnostics.contains("impact"));
        assert_eq!(config.ignored, 1);
    }

    #[test]
    fn test_seq_search_and_restart() {
        let store = store();
        let ann = Node::call(
            "seq_search",
            vec![Node::Array(vec![
                Node::call(
                    "bool_search",
                    vec![Node::Array(vec![Node::BoolVar(0)]), Node::atom("input_order"), Node::atom("indomain_max")],
                ),
                int_search(vec![Node::IntVar(2)], "smallest", "indomain_split"),
            ])],
        );
        let restart = Node::call("restart_geometric", vec![Node::Float(1.5), Node::Int(100)]);
        let (config, _) = build(&store, &[ann, restart], false);
        let config = config.unwrap();

        assert_eq!(config.branchings[0].kind, VarKind::Bool);
        assert_eq!(config.branchings[1].var_selection, VarSelection::Smallest);
        assert_eq!(config.restart, RestartPolicy::Geometric { base: 1.5, scale: 100 });
    }

    #[test]
    fn test_malformed_restart_is_unknown() {
        let store = store();
        let (config, diagnostics) = build(&store, &[Node::call("restart_luby", vec![Node::atom("x")])], false);

        assert_eq!(config.unwrap().restart, RestartPolicy::None);
        assert!(diagnostics.starts_with("Warning, ignored search annotation: restart_luby"));
    }

    #[test]
    fn test_undeclared_variable_in_search_fails() {
        let store = store();
        let ann = int_search(vec![Node::IntVar(9)], "input_order", "indomain_min");
        let (config, _) = build(&store, &[ann], true);

        assert!(matches!(
            config,
            Err(ModelError::UnknownVariable { kind: VarKind::Int, index: 9 })
        ));
    }
}
