//! Task status reporting

use colored::Colorize;
use std::fmt;

/// Receives per-task status updates from the runner.
///
/// `depth` is the nesting level (0 for top-level tasks); `title` is already interpolated.
pub trait TaskReporter: Send + Sync {
    fn started(&self, _depth: usize, _title: &str) {}
    fn completed(&self, _depth: usize, _title: &str) {}
    fn skipped(&self, _depth: usize, _title: &str) {}
    fn failed(&self, _depth: usize, _title: &str, _error: &dyn fmt::Display) {}
}

/// Reports nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl TaskReporter for SilentReporter {}

/// Plain terminal output, one line per status change
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    fn indent(depth: usize) -> String {
        "  ".repeat(depth + 1)
    }

    fn line(depth: usize, status: impl fmt::Display, title: impl fmt::Display) -> String {
        format!("{}{} {}", Self::indent(depth), status, title)
    }
}

impl TaskReporter for ConsoleReporter {
    fn started(&self, depth: usize, title: &str) {
        println!("{}", Self::line(depth, "->".blue(), title));
    }

    fn completed(&self, depth: usize, title: &str) {
        println!("{}", Self::line(depth, "done".green(), title.dimmed()));
    }

    fn skipped(&self, depth: usize, title: &str) {
        println!("{}", Self::line(depth, "skip".yellow(), title.dimmed()));
    }

    fn failed(&self, depth: usize, title: &str, error: &dyn fmt::Display) {
        eprintln!("{}", Self::line(depth, "failed".red(), title));
        eprintln!("{}  Error: {}", Self::indent(depth), error);
    }
}
