//! Variable kinds, domains and the Boolean-to-integer alias table

use super::error::{ModelError, ModelResult};
use super::ids::{IdAllocator, TheoryId};
use crate::ast::{BoolVarSpec, IntVarSpec, SetLit};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    Int,
    Bool,
    Set,
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VarKind::Int => "integer",
            VarKind::Bool => "Boolean",
            VarKind::Set => "set",
        };
        f.write_str(name)
    }
}

/// Integer domain, either a closed range or an explicit value set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain {
    Range { lo: i64, hi: i64 },
    Values(BTreeSet<i64>),
}

impl Domain {
    pub fn singleton(value: i64) -> Self {
        Domain::Range {
            lo: value,
            hi: value,
        }
    }

    pub fn range(lo: i64, hi: i64) -> Self {
        Domain::Range { lo, hi }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Domain::Range { lo, hi } => lo > hi,
            Domain::Values(values) => values.is_empty(),
        }
    }

    /// Number of values in the domain
    pub fn size(&self) -> u64 {
        match self {
            Domain::Range { lo, hi } if lo <= hi => {
                (*hi as i128 - *lo as i128 + 1).min(u64::MAX as i128) as u64
            }
            Domain::Range { .. } => 0,
            Domain::Values(values) => values.len() as u64,
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        match self {
            Domain::Range { lo, hi } => *lo <= value && value <= *hi,
            Domain::Values(values) => values.contains(&value),
        }
    }

    pub fn min(&self) -> Option<i64> {
        match self {
            Domain::Range { lo, hi } => (lo <= hi).then_some(*lo),
            Domain::Values(values) => values.first().copied(),
        }
    }

    pub fn max(&self) -> Option<i64> {
        match self {
            Domain::Range { lo, hi } => (lo <= hi).then_some(*hi),
            Domain::Values(values) => values.last().copied(),
        }
    }

    /// The single value of a singleton domain
    pub fn fixed_value(&self) -> Option<i64> {
        match (self.min(), self.max()) {
            (Some(lo), Some(hi)) if lo == hi => Some(lo),
            _ => None,
        }
    }

    /// Values in ascending order
    pub fn values(&self) -> Box<dyn Iterator<Item = i64> + '_> {
        match self {
            Domain::Range { lo, hi } => Box::new(*lo..=*hi),
            Domain::Values(values) => Box::new(values.iter().copied()),
        }
    }
}

impl From<&SetLit> for Domain {
    fn from(lit: &SetLit) -> Self {
        match lit {
            SetLit::Range { lo, hi } => Domain::Range { lo: *lo, hi: *hi },
            SetLit::Values(values) => Domain::Values(values.iter().copied().collect()),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Range { lo, hi } => write!(f, "{}..{}", lo, hi),
            Domain::Values(values) => {
                write!(f, "{{")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// An integer variable. The domain is a copy taken at declaration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerVariable {
    id: TheoryId,
    name: String,
    domain: Domain,
}

impl IntegerVariable {
    /// Validate `spec` and build the variable under the given id
    pub fn declare(spec: &IntVarSpec, name: &str, id: TheoryId) -> ModelResult<Self> {
        let domain = match (spec.assigned, &spec.domain) {
            (Some(value), _) => Domain::singleton(value),
            (None, Some(lit)) => Domain::from(lit),
            (None, None) => {
                return Err(ModelError::MissingDomain {
                    name: name.to_string(),
                })
            }
        };

        if domain.is_empty() {
            return Err(ModelError::EmptyDomain {
                name: name.to_string(),
            });
        }

        Ok(Self {
            id,
            name: name.to_string(),
            domain,
        })
    }

    /// Another name for this variable: same id, same domain
    pub fn aliased(&self, name: &str) -> Self {
        Self {
            id: self.id,
            name: name.to_string(),
            domain: self.domain.clone(),
        }
    }

    pub fn id(&self) -> TheoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanVariable {
    id: TheoryId,
    name: String,
    fixed: Option<bool>,
}

impl BooleanVariable {
    /// Build the variable, drawing its id from the model's counter
    pub fn declare(spec: &BoolVarSpec, name: &str, ids: &mut IdAllocator) -> Self {
        Self {
            id: ids.allocate(),
            name: name.to_string(),
            fixed: spec.assigned,
        }
    }

    pub fn aliased(&self, name: &str) -> Self {
        Self {
            id: self.id,
            name: name.to_string(),
            fixed: self.fixed,
        }
    }

    pub fn id(&self) -> TheoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Statically assigned value, if any
    pub fn fixed(&self) -> Option<bool> {
        self.fixed
    }
}

/// Set variables carry no domain here; they are known by position only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetVariable {
    index: usize,
}

impl SetVariable {
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Per integer-variable record of the Boolean variable standing in for it
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    links: Vec<Option<usize>>,
}

impl AliasTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            links: Vec::with_capacity(capacity),
        }
    }

    /// Track one more integer variable, initially unaliased
    pub fn push(&mut self) {
        self.links.push(None);
    }

    /// `int_index` is tracked and not yet linked
    pub fn check(&self, int_index: usize) -> ModelResult<()> {
        match self.links.get(int_index) {
            None => Err(ModelError::UnknownVariable {
                kind: VarKind::Int,
                index: int_index,
            }),
            Some(Some(existing)) => Err(ModelError::DoubleAlias {
                int_index,
                existing: *existing,
            }),
            Some(None) => Ok(()),
        }
    }

    pub fn link(&mut self, int_index: usize, bool_index: usize) -> ModelResult<()> {
        self.check(int_index)?;
        self.links[int_index] = Some(bool_index);
        Ok(())
    }

    pub fn resolve(&self, int_index: usize) -> Option<usize> {
        self.links.get(int_index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Number of integer variables that have an alias
    pub fn linked_count(&self) -> usize {
        self.links.iter().filter(|link| link.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assigned_variable_gets_singleton_domain() {
        let spec = IntVarSpec::assigned(5);
        let var = IntegerVariable::declare(&spec, "y", TheoryId::FIRST_FREE).unwrap();

        assert_eq!(var.domain(), &Domain::singleton(5));
        assert_eq!(var.domain().fixed_value(), Some(5));
        assert_eq!(var.domain().size(), 1);
    }

    #[test]
    fn test_assigned_value_takes_precedence_over_domain() {
        let spec = IntVarSpec {
            assigned: Some(2),
            domain: Some(SetLit::Range { lo: 0, hi: 9 }),
            ..IntVarSpec::default()
        };
        let var = IntegerVariable::declare(&spec, "z", TheoryId::FIRST_FREE).unwrap();
        assert_eq!(var.domain().values().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_missing_domain() {
        let result = IntegerVariable::declare(&IntVarSpec::default(), "x", TheoryId::FIRST_FREE);
        assert!(matches!(result, Err(ModelError::MissingDomain { name }) if name == "x"));
    }

    #[test]
    fn test_empty_domains_rejected() {
        let range = IntVarSpec::with_domain(SetLit::Range { lo: 3, hi: 1 });
        let values = IntVarSpec::with_domain(SetLit::Values(vec![]));

        assert!(matches!(
            IntegerVariable::declare(&range, "a", TheoryId::FIRST_FREE),
            Err(ModelError::EmptyDomain { .. })
        ));
        assert!(matches!(
            IntegerVariable::declare(&values, "b", TheoryId::FIRST_FREE),
            Err(ModelError::EmptyDomain { .. })
        ));
    }

    #[test]
    fn test_domain_is_a_snapshot() {
        let mut spec = IntVarSpec::with_domain(SetLit::Values(vec![3, 1, 2, 3]));
        let var = IntegerVariable::declare(&spec, "x", TheoryId::FIRST_FREE).unwrap();

        spec.domain = Some(SetLit::Values(vec![7]));

        assert_eq!(var.domain().values().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_domain_display() {
        assert_eq!(Domain::range(1, 3).to_string(), "1..3");
        let values = Domain::from(&SetLit::Values(vec![5, 1, 3]));
        assert_eq!(values.to_string(), "{1,3,5}");
        assert_eq!(values.min(), Some(1));
        assert_eq!(values.max(), Some(5));
        assert!(!values.contains(2));
    }

    #[test]
    fn test_boolean_ids_start_above_constants() {
        let mut ids = IdAllocator::new();
        let a = BooleanVariable::declare(&BoolVarSpec::default(), "a", &mut ids);
        let b = BooleanVariable::declare(&BoolVarSpec::assigned(true), "b", &mut ids);

        assert_eq!(a.id().get(), 3);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.fixed(), None);
        assert_eq!(b.fixed(), Some(true));
    }

    #[test]
    fn test_alias_single_write() {
        let mut aliases = AliasTable::with_capacity(2);
        aliases.push();
        aliases.push();

        assert_eq!(aliases.resolve(1), None);
        aliases.link(1, 0).unwrap();
        assert_eq!(aliases.resolve(1), Some(0));

        let second = aliases.link(1, 4);
        assert!(matches!(
            second,
            Err(ModelError::DoubleAlias {
                int_index: 1,
                existing: 0
            })
        ));
        assert_eq!(aliases.resolve(1), Some(0));
        assert_eq!(aliases.linked_count(), 1);
    }

    #[test]
    fn test_alias_unknown_integer() {
        let mut aliases = AliasTable::default();
        assert!(matches!(
            aliases.link(0, 0),
            Err(ModelError::UnknownVariable {
                kind: VarKind::Int,
                index: 0
            })
        ));
    }
}
