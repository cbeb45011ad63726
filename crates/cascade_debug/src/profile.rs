//! Section profiler.
//!
//! Accumulates call counts and wall time per section path. Nested sections
//! are keyed by their full path joined with `;`, so a report can be fed to
//! folded-stack tools.

use std::collections::HashMap;
use std::fmt::Write;
use std::time::{Duration, Instant};

use cascade_engine::Profiler;

/// Totals for one section path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SectionStats {
    /// Times the section was entered.
    pub calls: u64,
    /// Cumulative time inside the section, children included.
    pub total: Duration,
}

struct OpenSection {
    path: String,
    started: Instant,
}

/// A [`Profiler`] that times every section.
#[derive(Default)]
pub struct SectionProfiler {
    stack: Vec<OpenSection>,
    sections: HashMap<String, SectionStats>,
}

impl SectionProfiler {
    /// Creates an empty profiler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stats for a path, if it was ever entered.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<SectionStats> {
        self.sections.get(path).copied()
    }

    /// Number of sections currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns all sections, most total time first.
    #[must_use]
    pub fn report(&self) -> Vec<(&str, SectionStats)> {
        let mut rows: Vec<(&str, SectionStats)> = self.sections.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        rows.sort_by(|a, b| b.1.total.cmp(&a.1.total).then_with(|| a.0.cmp(b.0)));
        rows
    }

    /// Renders the report as a table, at most `limit` rows.
    #[must_use]
    pub fn format_report(&self, limit: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:>8} {:>12}  section", "calls", "total");
        for (path, stats) in self.report().into_iter().take(limit) {
            let _ = writeln!(out, "{:>8} {:>12?}  {path}", stats.calls, stats.total);
        }
        out
    }

    /// Discards all totals and open sections.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.sections.clear();
    }
}

impl Profiler for SectionProfiler {
    fn push(&mut self, section: &dyn Fn() -> String) {
        let name = section();
        let path = match self.stack.last() {
            Some(parent) => format!("{};{name}", parent.path),
            None => name,
        };
        self.stack.push(OpenSection {
            path,
            started: Instant::now(),
        });
    }

    fn pop(&mut self) {
        let Some(open) = self.stack.pop() else {
            return;
        };
        let stats = self.sections.entry(open.path).or_default();
        stats.calls += 1;
        stats.total += open.started.elapsed();
    }
}
