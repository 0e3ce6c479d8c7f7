//! Search strategy construction from solve annotations

pub mod brancher;

pub use brancher::{BrancherBuilder, Branching, RestartPolicy, SearchConfig, ValSelection, VarSelection};
