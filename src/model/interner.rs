//! Interning of symbols and integer constants into theory ids

use super::error::{ModelError, ModelResult};
use super::ids::{IdAllocator, TheoryId};
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

/// Key of an interned term, used in lookup failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternKey {
    Symbol(String),
    Integer(i64),
}

impl fmt::Display for InternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternKey::Symbol(name) => write!(f, "symbol `{}'", name),
            InternKey::Integer(value) => write!(f, "integer {}", value),
        }
    }
}

/// Assigns theory ids to symbols, integer constants and keyless terms.
///
/// All three draw from one counter, so an id handed out here is never
/// handed out again by the same interner.
#[derive(Debug, Default)]
pub struct Interner {
    ids: IdAllocator,
    symbols: HashMap<String, TheoryId>,
    integers: HashMap<i64, TheoryId>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `name`, allocating one on first sight
    pub fn intern_symbol(&mut self, name: &str) -> TheoryId {
        if let Some(&id) = self.symbols.get(name) {
            return id;
        }
        let id = self.ids.allocate();
        trace!(symbol = name, %id, "interned symbol");
        self.symbols.insert(name.to_string(), id);
        id
    }

    /// Id of the integer constant `value`, allocating one on first sight
    pub fn intern_integer(&mut self, value: i64) -> TheoryId {
        if let Some(&id) = self.integers.get(&value) {
            return id;
        }
        let id = self.ids.allocate();
        trace!(value, %id, "interned integer");
        self.integers.insert(value, id);
        id
    }

    pub fn lookup_symbol_id(&self, name: &str) -> ModelResult<TheoryId> {
        self.symbols
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::NotInterned(InternKey::Symbol(name.to_string())))
    }

    pub fn lookup_integer_id(&self, value: i64) -> ModelResult<TheoryId> {
        self.integers
            .get(&value)
            .copied()
            .ok_or(ModelError::NotInterned(InternKey::Integer(value)))
    }

    /// Fresh id for a compound term with no string or integer key
    pub fn allocate_term_id(&mut self) -> TheoryId {
        self.ids.allocate()
    }

    /// Fresh id for an element-access term
    pub fn allocate_element_id(&mut self) -> TheoryId {
        self.ids.allocate()
    }

    /// The shared counter, for callers that allocate ids of their own kind
    pub fn ids_mut(&mut self) -> &mut IdAllocator {
        &mut self.ids
    }

    pub fn ids_allocated(&self) -> usize {
        self.ids.allocated()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn integer_count(&self) -> usize {
        self.integers.len()
    }
}
