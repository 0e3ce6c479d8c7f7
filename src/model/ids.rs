//! Theory identifiers and the counter that hands them out

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique name of a term (symbol, integer constant, variable or structural
/// node) within one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TheoryId(u32);

impl TheoryId {
    /// Never assigned; marks "no id yet".
    pub const INVALID: TheoryId = TheoryId(0);
    /// Constant Boolean term `false`.
    pub const FALSE: TheoryId = TheoryId(1);
    /// Constant Boolean term `true`.
    pub const TRUE: TheoryId = TheoryId(2);
    /// First id the allocator hands out.
    pub const FIRST_FREE: TheoryId = TheoryId(3);

    /// Rebuild an id from its numeric value, as read back from an engine
    pub const fn from_raw(raw: u32) -> Self {
        TheoryId(raw)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    /// Whether this is one of the two constant Boolean terms
    pub fn is_reserved(self) -> bool {
        self.0 < Self::FIRST_FREE.0
    }

    /// Id of the constant Boolean term for `value`
    pub fn of_bool(value: bool) -> Self {
        if value {
            Self::TRUE
        } else {
            Self::FALSE
        }
    }
}

impl fmt::Display for TheoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic id counter owned by a single model.
///
/// Starts above the reserved constants and never goes backwards, so ids
/// reflect allocation order.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next: TheoryId::FIRST_FREE.0,
        }
    }

    /// Hand out the next unused id
    pub fn allocate(&mut self) -> TheoryId {
        let id = TheoryId(self.next);
        self.next += 1;
        id
    }

    /// The id the next `allocate` call will return
    pub fn peek(&self) -> TheoryId {
        TheoryId(self.next)
    }

    /// Number of ids handed out so far (reserved constants excluded)
    pub fn allocated(&self) -> usize {
        (self.next - TheoryId::FIRST_FREE.0) as usize
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_constants() {
        assert!(!TheoryId::INVALID.is_valid());
        assert!(TheoryId::FALSE.is_reserved());
        assert!(TheoryId::TRUE.is_reserved());
        assert_eq!(TheoryId::of_bool(false), TheoryId::FALSE);
        assert_eq!(TheoryId::of_bool(true).get(), 2);
    }

    #[test]
    fn test_allocation_is_monotonic() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.peek(), TheoryId::FIRST_FREE);

        let first = ids.allocate();
        let second = ids.allocate();

        assert_eq!(first.get(), 3);
        assert!(second > first);
        assert!(!second.is_reserved());
        assert_eq!(ids.allocated(), 2);
    }

    #[test]
    fn test_independent_allocators_restart() {
        let mut a = IdAllocator::new();
        let mut b = IdAllocator::new();
        a.allocate();
        a.allocate();

        // A fresh counter is not affected by another model's allocations
        assert_eq!(b.allocate(), TheoryId::FIRST_FREE);
    }
}
