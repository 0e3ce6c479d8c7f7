//! The model container and its construction protocol

use super::error::{ModelError, ModelResult};
use super::ids::TheoryId;
use super::interner::Interner;
use super::store::VariableStore;
use super::variables::{BooleanVariable, Domain, IntegerVariable, VarKind};
use crate::ast::{BoolVarSpec, ConExpr, IntVarSpec, Node, SetVarSpec};
use crate::engine::{
    Engine, Gateway, Objective, ResolvedArg, ResolvedConstraint, Solution, VariableDecl,
};
use crate::output::Printer;
use crate::search::{BrancherBuilder, SearchConfig};
use std::fmt;
use std::io::Write;
use tracing::{debug, info};

/// Construction phases, in the only order a model may pass through them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Empty,
    Sized,
    Declaring,
    ConstraintsPosted,
    GoalSet,
    BranchersBuilt,
    Solved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Satisfy,
    Minimize,
    Maximize,
}

/// What `run` produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub solutions: usize,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStatistics {
    pub int_vars: usize,
    pub bool_vars: usize,
    pub set_vars: usize,
    pub aliases: usize,
    pub constraints: usize,
    pub symbols: usize,
    pub integers: usize,
    pub ids_allocated: usize,
}

impl fmt::Display for ModelStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model Statistics:")?;
        writeln!(f, "  Integer variables: {}", self.int_vars)?;
        writeln!(f, "  Boolean variables: {}", self.bool_vars)?;
        writeln!(f, "  Set variables: {}", self.set_vars)?;
        writeln!(f, "  Boolean aliases: {}", self.aliases)?;
        writeln!(f, "  Constraints posted: {}", self.constraints)?;
        writeln!(f, "  Interned symbols: {}", self.symbols)?;
        writeln!(f, "  Interned integers: {}", self.integers)?;
        writeln!(f, "  Theory ids allocated: {}", self.ids_allocated)?;
        Ok(())
    }
}

/// Owns everything a model is made of and hands it to an engine piece by
/// piece as it is declared.
///
/// Operations must follow `init`, declarations and constraints, one goal,
/// `create_branchers`, then `run`. Anything out of that order fails with
/// [`ModelError::NotInitialized`] or [`ModelError::OutOfPhase`].
pub struct Model<E: Engine> {
    interner: Interner,
    vars: VariableStore,
    gateway: Gateway<E>,
    phase: Phase,
    method: Option<Method>,
    opt_var: Option<usize>,
    solve_annotations: Vec<Node>,
    search: Option<SearchConfig>,
    current: Option<Solution>,
}

impl<E: Engine> Model<E> {
    pub fn new(engine: E) -> Self {
        Self {
            interner: Interner::new(),
            vars: VariableStore::default(),
            gateway: Gateway::new(engine),
            phase: Phase::Empty,
            method: None,
            opt_var: None,
            solve_annotations: Vec::new(),
            search: None,
            current: None,
        }
    }

    /// Size the three variable sequences
    pub fn init(&mut self, int_count: usize, bool_count: usize, set_count: usize) -> ModelResult<()> {
        if self.phase != Phase::Empty {
            return Err(ModelError::OutOfPhase {
                operation: "init",
                phase: self.phase,
            });
        }
        self.vars = VariableStore::sized(int_count, bool_count, set_count);
        self.phase = Phase::Sized;
        info!(int_count, bool_count, set_count, "model initialized");
        Ok(())
    }

    /// Declarations and constraints are accepted from `init` until the goal is set
    fn require_building(&self, operation: &'static str) -> ModelResult<()> {
        match self.phase {
            Phase::Empty => Err(ModelError::NotInitialized),
            Phase::Sized | Phase::Declaring | Phase::ConstraintsPosted => Ok(()),
            phase => Err(ModelError::OutOfPhase { operation, phase }),
        }
    }

    fn require_phase(&self, operation: &'static str, expected: Phase) -> ModelResult<()> {
        match self.phase {
            Phase::Empty => Err(ModelError::NotInitialized),
            phase if phase == expected => Ok(()),
            phase => Err(ModelError::OutOfPhase { operation, phase }),
        }
    }

    fn declared(&mut self) {
        if self.phase == Phase::Sized {
            self.phase = Phase::Declaring;
        }
    }

    /// Declare the next integer variable and return its index
    pub fn new_int_var(&mut self, spec: &IntVarSpec, name: &str) -> ModelResult<usize> {
        self.require_building("new_int_var")?;
        self.vars.check_room(VarKind::Int)?;

        let var = match spec.alias {
            Some(target) => self.vars.int(target)?.aliased(name),
            None => {
                let var = IntegerVariable::declare(spec, name, self.interner.ids_mut().allocate())?;
                self.gateway.declare(&VariableDecl::Int {
                    id: var.id(),
                    domain: var.domain().clone(),
                })?;
                var
            }
        };

        debug!(name, id = %var.id(), domain = %var.domain(), "declared integer variable");
        let index = self.vars.push_int(var, spec.introduced)?;
        self.declared();
        Ok(index)
    }

    /// Declare the next Boolean variable and return its index
    pub fn new_bool_var(&mut self, spec: &BoolVarSpec, name: &str) -> ModelResult<usize> {
        self.require_building("new_bool_var")?;
        self.vars.check_room(VarKind::Bool)?;

        let var = match spec.alias {
            Some(target) => self.vars.bool(target)?.aliased(name),
            None => {
                let var = BooleanVariable::declare(spec, name, self.interner.ids_mut());
                self.gateway.declare(&VariableDecl::Bool {
                    id: var.id(),
                    fixed: var.fixed(),
                })?;
                var
            }
        };

        debug!(name, id = %var.id(), "declared Boolean variable");
        let index = self.vars.push_bool(var, spec.introduced)?;
        self.declared();
        Ok(index)
    }

    pub fn new_set_var(&mut self, spec: &SetVarSpec) -> ModelResult<usize> {
        self.require_building("new_set_var")?;
        self.vars.check_room(VarKind::Set)?;
        let index = self.vars.sets().len();
        self.gateway.declare(&VariableDecl::Set { index })?;
        self.vars.push_set(spec.introduced)?;
        self.declared();
        Ok(index)
    }

    /// Let Boolean variable `bool_index` stand in for integer variable
    /// `int_index`.
    ///
    /// Later references to the integer resolve to the Boolean, and the
    /// engine receives a `bool2int` channel between the two.
    pub fn alias_bool_to_int(&mut self, int_index: usize, bool_index: usize) -> ModelResult<()> {
        self.require_building("alias_bool_to_int")?;
        self.vars.check_alias(int_index, bool_index)?;

        let channel = ResolvedConstraint {
            name: "bool2int".to_string(),
            symbol: self.interner.intern_symbol("bool2int"),
            term: self.interner.allocate_term_id(),
            element: None,
            args: vec![
                ResolvedArg::BoolVar {
                    index: bool_index,
                    id: self.vars.bool_id(bool_index)?,
                },
                ResolvedArg::IntVar {
                    index: int_index,
                    id: self.vars.int_id(int_index)?,
                },
            ],
            annotation: None,
        };
        self.gateway.post(&channel)?;
        self.vars.link_alias(int_index, bool_index)?;
        debug!(int_index, bool_index, "linked Boolean alias");
        Ok(())
    }

    pub fn bool_alias_of(&self, int_index: usize) -> Option<usize> {
        self.vars.bool_alias(int_index)
    }

    /// Resolve `expr` against the declared variables and post it
    pub fn post_constraint(&mut self, expr: &ConExpr, annotation: Option<&Node>) -> ModelResult<()> {
        self.require_building("post_constraint")?;
        for arg in &expr.args {
            self.check_references(arg)?;
        }

        let symbol = self.interner.intern_symbol(&expr.id);
        let term = self.interner.allocate_term_id();
        let element = expr
            .id
            .contains("element")
            .then(|| self.interner.allocate_element_id());
        let args = expr
            .args
            .iter()
            .map(|arg| self.resolve(arg))
            .collect::<ModelResult<Vec<_>>>()?;

        self.gateway.post(&ResolvedConstraint {
            name: expr.id.clone(),
            symbol,
            term,
            element,
            args,
            annotation: annotation.cloned(),
        })?;
        self.phase = Phase::ConstraintsPosted;
        Ok(())
    }

    /// Every variable index in `node` is declared
    fn check_references(&self, node: &Node) -> ModelResult<()> {
        match node {
            Node::IntVar(index) => {
                self.vars.int(*index)?;
                if let Some(bool_index) = self.vars.bool_alias(*index) {
                    self.vars.bool(bool_index)?;
                }
            }
            Node::BoolVar(index) => {
                self.vars.bool(*index)?;
            }
            Node::SetVar(index) => {
                self.vars.set(*index)?;
            }
            Node::Array(items) => {
                for item in items {
                    self.check_references(item)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn resolve(&mut self, node: &Node) -> ModelResult<ResolvedArg> {
        Ok(match node {
            Node::Bool(value) => ResolvedArg::Bool {
                value: *value,
                id: TheoryId::of_bool(*value),
            },
            Node::Int(value) => ResolvedArg::Int {
                value: *value,
                id: self.interner.intern_integer(*value),
            },
            Node::Float(value) => ResolvedArg::Float(*value),
            Node::Set(lit) => ResolvedArg::Set(Domain::from(lit)),
            Node::Str(text) => ResolvedArg::Str(text.clone()),
            Node::Atom(name) => ResolvedArg::Atom {
                name: name.clone(),
                id: self.interner.intern_symbol(name),
            },
            Node::IntVar(index) => {
                let id = self.vars.int_id(*index)?;
                match self.vars.bool_alias(*index) {
                    Some(bool_index) => ResolvedArg::BoolVar {
                        index: bool_index,
                        id: self.vars.bool_id(bool_index)?,
                    },
                    None => ResolvedArg::IntVar { index: *index, id },
                }
            }
            Node::BoolVar(index) => ResolvedArg::BoolVar {
                index: *index,
                id: self.vars.bool_id(*index)?,
            },
            Node::SetVar(index) => {
                self.vars.set(*index)?;
                ResolvedArg::SetVar { index: *index }
            }
            Node::Array(items) => {
                let id = self.interner.allocate_term_id();
                let items = items
                    .iter()
                    .map(|item| self.resolve(item))
                    .collect::<ModelResult<Vec<_>>>()?;
                ResolvedArg::Array { id, items }
            }
            Node::Call { id: name, args } => {
                let id = self.interner.intern_symbol(name);
                let args = args
                    .iter()
                    .map(|arg| self.resolve(arg))
                    .collect::<ModelResult<Vec<_>>>()?;
                ResolvedArg::Call {
                    name: name.clone(),
                    id,
                    args,
                }
            }
        })
    }

    fn set_goal(&mut self, method: Method, opt_var: Option<usize>, annotations: Vec<Node>) -> ModelResult<()> {
        if self.method.is_some() {
            return Err(ModelError::GoalAlreadySet);
        }
        self.require_building("solve")?;

        let objective = match (method, opt_var) {
            (Method::Minimize, Some(index)) => Objective::Minimize(self.objective_arg(index)?),
            (Method::Maximize, Some(index)) => Objective::Maximize(self.objective_arg(index)?),
            _ => Objective::Satisfy,
        };
        self.gateway.set_goal(&objective)?;

        self.method = Some(method);
        self.opt_var = opt_var;
        self.solve_annotations = annotations;
        self.phase = Phase::GoalSet;
        info!(?method, "solve goal set");
        Ok(())
    }

    fn objective_arg(&mut self, index: usize) -> ModelResult<ResolvedArg> {
        self.vars.int(index)?;
        self.resolve(&Node::IntVar(index))
    }

    pub fn solve(&mut self, annotations: Vec<Node>) -> ModelResult<()> {
        self.set_goal(Method::Satisfy, None, annotations)
    }

    pub fn minimize(&mut self, var: usize, annotations: Vec<Node>) -> ModelResult<()> {
        self.set_goal(Method::Minimize, Some(var), annotations)
    }

    pub fn maximize(&mut self, var: usize, annotations: Vec<Node>) -> ModelResult<()> {
        self.set_goal(Method::Maximize, Some(var), annotations)
    }

    /// Build the search configuration from `annotations`, or from the
    /// goal's own annotations when none are given, and hand it to the engine.
    pub fn create_branchers(
        &mut self,
        annotations: Option<&[Node]>,
        ignore_unknown: bool,
        diagnostics: &mut dyn Write,
    ) -> ModelResult<()> {
        self.require_phase("create_branchers", Phase::GoalSet)?;

        let annotations = annotations.unwrap_or(self.solve_annotations.as_slice());
        let config = BrancherBuilder::new(&self.vars, ignore_unknown, diagnostics).build(annotations)?;
        self.gateway.configure(&config)?;

        self.search = Some(config);
        self.phase = Phase::BranchersBuilt;
        info!("branchers created");
        Ok(())
    }

    /// Solve, printing every solution followed by a separator line
    pub fn run(&mut self, out: &mut dyn Write, printer: &Printer) -> ModelResult<RunSummary> {
        self.require_phase("run", Phase::BranchersBuilt)?;

        info!(engine = self.gateway.engine().name(), "solving");
        let outcome = self.gateway.solve()?;
        let summary = RunSummary {
            solutions: outcome.solutions.len(),
            complete: outcome.complete,
        };

        for solution in outcome.solutions {
            self.current = Some(solution);
            printer.print(out, self)?;
            writeln!(out, "----------")?;
        }
        match (summary.solutions, summary.complete) {
            (0, true) => writeln!(out, "=====UNSATISFIABLE=====")?,
            (0, false) => writeln!(out, "=====UNKNOWN=====")?,
            (_, true) => writeln!(out, "==========")?,
            (_, false) => {}
        }
        out.flush()?;

        self.phase = Phase::Solved;
        info!(solutions = summary.solutions, complete = summary.complete, "run finished");
        Ok(summary)
    }

    /// Print the current solution, or the declared domains if there is none
    pub fn print(&self, out: &mut dyn Write, printer: &Printer) -> ModelResult<()> {
        printer.print(out, self)
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn interner_mut(&mut self) -> &mut Interner {
        &mut self.interner
    }

    pub fn variables(&self) -> &VariableStore {
        &self.vars
    }

    pub fn int_var_id(&self, index: usize) -> ModelResult<TheoryId> {
        self.vars.int_id(index)
    }

    pub fn bool_var_id(&self, index: usize) -> ModelResult<TheoryId> {
        self.vars.bool_id(index)
    }

    pub fn false_id(&self) -> TheoryId {
        TheoryId::FALSE
    }

    pub fn true_id(&self) -> TheoryId {
        TheoryId::TRUE
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn method(&self) -> Option<Method> {
        self.method
    }

    pub fn opt_var(&self) -> Option<usize> {
        self.opt_var
    }

    pub fn solve_annotations(&self) -> &[Node] {
        &self.solve_annotations
    }

    pub fn search_config(&self) -> Option<&SearchConfig> {
        self.search.as_ref()
    }

    /// Solution being printed, set while `run` walks the engine's results
    pub fn current_solution(&self) -> Option<&Solution> {
        self.current.as_ref()
    }

    pub fn engine(&self) -> &E {
        self.gateway.engine()
    }

    pub fn statistics(&self) -> ModelStatistics {
        ModelStatistics {
            int_vars: self.vars.ints().len(),
            bool_vars: self.vars.bools().len(),
            set_vars: self.vars.sets().len(),
            aliases: self.vars.aliases().linked_count(),
            constraints: self.gateway.constraints_posted(),
            symbols: self.interner.symbol_count(),
            integers: self.interner.integer_count(),
            ids_allocated: self.interner.ids_allocated(),
        }
    }
}
