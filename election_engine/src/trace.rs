//! Human-readable round-by-round output for verbose runs.

use crate::tally::{percentages, sorted_desc, Tally};
use colored::*;

/// Collects trace lines and echoes them to stdout when enabled. A disabled
/// trace drops everything, so callers can log unconditionally.
#[derive(Debug, Default, Clone)]
pub struct Trace {
    enabled: bool,
    lines: Vec<String>,
}

impl Trace {
    pub fn new(verbose: bool) -> Self {
        Self {
            enabled: verbose,
            lines: Vec::new(),
        }
    }

    pub fn quiet() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn heading(&mut self, text: impl Into<String>) {
        if !self.enabled {
            return;
        }
        let text = text.into();
        println!("{}", text.bright_cyan().bold());
        self.lines.push(text);
    }

    pub fn line(&mut self, text: impl Into<String>) {
        if !self.enabled {
            return;
        }
        let text = text.into();
        println!("{}", text);
        self.lines.push(text);
    }

    pub fn outcome(&mut self, text: impl Into<String>) {
        if !self.enabled {
            return;
        }
        let text = text.into();
        println!("{}", text.bright_green());
        self.lines.push(text);
    }

    /// One line per entry, highest first, with its share of the total.
    pub fn tally(&mut self, tally: &Tally) {
        if !self.enabled {
            return;
        }
        let pcts = percentages(tally, None);
        for (name, votes) in sorted_desc(tally) {
            let pct = pcts.get(&name).copied().unwrap_or(0.0);
            let text = format!("  {:<24} {:>12.2} ({:.2} pct)", name, votes, pct);
            println!("{}", text);
            self.lines.push(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_trace_records_nothing() {
        let mut trace = Trace::quiet();
        trace.heading("Round 1");
        trace.line("A : 10");
        assert!(trace.lines().is_empty());
    }

    #[test]
    fn verbose_trace_keeps_lines() {
        let mut trace = Trace::new(true);
        trace.heading("Round 1");
        let mut t = Tally::new();
        t.insert("A".to_string(), 3.0);
        t.insert("B".to_string(), 1.0);
        trace.tally(&t);
        assert_eq!(trace.lines().len(), 3);
        assert!(trace.lines()[1].contains("A"));
        assert!(trace.lines()[1].contains("75.00 pct"));
    }
}
