//! Solution output

pub mod printer;

pub use printer::Printer;
