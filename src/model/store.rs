//! Dense per-kind variable sequences with their introduced flags

use super::error::{ModelError, ModelResult};
use super::ids::TheoryId;
use super::variables::{AliasTable, BooleanVariable, IntegerVariable, SetVariable, VarKind};

/// Variables of one model, each kind in declaration order.
///
/// Sized once by `init`; a kind cannot grow past its declared count.
#[derive(Debug, Default)]
pub struct VariableStore {
    int_capacity: usize,
    bool_capacity: usize,
    set_capacity: usize,
    ints: Vec<IntegerVariable>,
    int_introduced: Vec<bool>,
    aliases: AliasTable,
    bools: Vec<BooleanVariable>,
    bool_introduced: Vec<bool>,
    sets: Vec<SetVariable>,
    set_introduced: Vec<bool>,
}

impl VariableStore {
    pub fn sized(int_count: usize, bool_count: usize, set_count: usize) -> Self {
        Self {
            int_capacity: int_count,
            bool_capacity: bool_count,
            set_capacity: set_count,
            ints: Vec::with_capacity(int_count),
            int_introduced: Vec::with_capacity(int_count),
            aliases: AliasTable::with_capacity(int_count),
            bools: Vec::with_capacity(bool_count),
            bool_introduced: Vec::with_capacity(bool_count),
            sets: Vec::with_capacity(set_count),
            set_introduced: Vec::with_capacity(set_count),
        }
    }

    pub(crate) fn check_room(&self, kind: VarKind) -> ModelResult<()> {
        let (len, capacity) = match kind {
            VarKind::Int => (self.ints.len(), self.int_capacity),
            VarKind::Bool => (self.bools.len(), self.bool_capacity),
            VarKind::Set => (self.sets.len(), self.set_capacity),
        };
        if len >= capacity {
            return Err(ModelError::TooManyVariables { kind, capacity });
        }
        Ok(())
    }

    pub(crate) fn push_int(&mut self, var: IntegerVariable, introduced: bool) -> ModelResult<usize> {
        self.check_room(VarKind::Int)?;
        self.ints.push(var);
        self.int_introduced.push(introduced);
        self.aliases.push();
        Ok(self.ints.len() - 1)
    }

    pub(crate) fn push_bool(&mut self, var: BooleanVariable, introduced: bool) -> ModelResult<usize> {
        self.check_room(VarKind::Bool)?;
        self.bools.push(var);
        self.bool_introduced.push(introduced);
        Ok(self.bools.len() - 1)
    }

    pub(crate) fn push_set(&mut self, introduced: bool) -> ModelResult<usize> {
        self.check_room(VarKind::Set)?;
        let index = self.sets.len();
        self.sets.push(SetVariable::new(index));
        self.set_introduced.push(introduced);
        Ok(index)
    }

    /// Fails the way `link_alias` would, without linking
    pub(crate) fn check_alias(&self, int_index: usize, bool_index: usize) -> ModelResult<()> {
        if bool_index >= self.bools.len() {
            return Err(ModelError::UnknownVariable {
                kind: VarKind::Bool,
                index: bool_index,
            });
        }
        self.aliases.check(int_index)
    }

    pub(crate) fn link_alias(&mut self, int_index: usize, bool_index: usize) -> ModelResult<()> {
        self.check_alias(int_index, bool_index)?;
        self.aliases.link(int_index, bool_index)
    }

    pub fn int(&self, index: usize) -> ModelResult<&IntegerVariable> {
        self.ints.get(index).ok_or(ModelError::UnknownVariable {
            kind: VarKind::Int,
            index,
        })
    }

    pub fn bool(&self, index: usize) -> ModelResult<&BooleanVariable> {
        self.bools.get(index).ok_or(ModelError::UnknownVariable {
            kind: VarKind::Bool,
            index,
        })
    }

    pub fn set(&self, index: usize) -> ModelResult<&SetVariable> {
        self.sets.get(index).ok_or(ModelError::UnknownVariable {
            kind: VarKind::Set,
            index,
        })
    }

    pub fn int_id(&self, index: usize) -> ModelResult<TheoryId> {
        Ok(self.int(index)?.id())
    }

    pub fn bool_id(&self, index: usize) -> ModelResult<TheoryId> {
        Ok(self.bool(index)?.id())
    }

    /// The Boolean variable standing in for integer variable `int_index`
    pub fn bool_alias(&self, int_index: usize) -> Option<usize> {
        self.aliases.resolve(int_index)
    }

    pub fn ints(&self) -> &[IntegerVariable] {
        &self.ints
    }

    pub fn bools(&self) -> &[BooleanVariable] {
        &self.bools
    }

    pub fn sets(&self) -> &[SetVariable] {
        &self.sets
    }

    pub fn int_introduced(&self, index: usize) -> bool {
        self.int_introduced.get(index).copied().unwrap_or(false)
    }

    pub fn bool_introduced(&self, index: usize) -> bool {
        self.bool_introduced.get(index).copied().unwrap_or(false)
    }

    pub fn set_introduced(&self, index: usize) -> bool {
        self.set_introduced.get(index).copied().unwrap_or(false)
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }
}
