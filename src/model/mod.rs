//! Theory ids, interning, variables and the model container

pub mod container;
pub mod error;
pub mod ids;
pub mod interner;
pub mod store;
pub mod variables;

pub use container::{Method, Model, ModelStatistics, Phase, RunSummary};
pub use error::{ModelError, ModelResult};
pub use ids::{IdAllocator, TheoryId};
pub use interner::{InternKey, Interner};
pub use store::VariableStore;
pub use variables::{AliasTable, BooleanVariable, Domain, IntegerVariable, SetVariable, VarKind};
