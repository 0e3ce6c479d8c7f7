//! Console formatting for the binary's status messages

use crate::model::{ModelStatistics, RunSummary};

/// Formatting of run results for the terminal
pub struct SummaryFormatter;

impl SummaryFormatter {
    /// One-line status for a finished run
    pub fn format_summary(summary: &RunSummary, elapsed_secs: f64) -> String {
        match (summary.solutions, summary.complete) {
            (0, true) => format!("No solution exists ({:.3}s)", elapsed_secs),
            (0, false) => format!("No solution found ({:.3}s)", elapsed_secs),
            (n, true) => format!("Found {} solution(s), search complete ({:.3}s)", n, elapsed_secs),
            (n, false) => format!("Found {} solution(s) ({:.3}s)", n, elapsed_secs),
        }
    }

    /// Statistics as `%%` comment lines, so they can follow solution output
    pub fn format_statistics(stats: &ModelStatistics) -> String {
        stats
            .to_string()
            .lines()
            .map(|line| format!("%% {}\n", line))
            .collect()
    }
}

/// ANSI colouring, disabled by `NO_COLOR` or a dumb terminal
pub struct ColorOutput;

impl ColorOutput {
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn supports_color() -> bool {
        std::env::var_os("NO_COLOR").is_none()
            && std::env::var("TERM").map_or(true, |term| term != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}
