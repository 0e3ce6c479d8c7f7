//! Utilities for the command line binary

pub mod display;

pub use display::{Color, ColorOutput, SummaryFormatter};
