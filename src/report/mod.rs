//! Comparison table built from criterion's bencher-format output.
//!
//! Input lines look like
//!
//! ```text
//! test Each_Concrete/Doublets_Split_Volatile ... bench:     1,234 ns/iter (+/- 56)
//! ```
//!
//! Each Doublets cell is annotated with how many times faster it is than the
//! fastest Neo4j mode for the same operation.

pub mod report_error;

#[cfg(test)]
mod tests;

use regex::{Captures, Regex};
use std::collections::BTreeMap;

pub use self::report_error::ReportError;
use crate::bench::{Backend, Operation};

const BENCH_LINE: &str =
    r"^test\s+(\w+)/(\w+)\s+\.\.\.\s+bench:\s+([\d,]+)\s+ns/iter\s+\(\+/-\s+([\d,]+)\)";
const FAILURE_LINE: &str = r"panicked at|^error(\[\w+\])?:|^Error:|^test result: FAILED";

const OPERATION_HEADER: &str = "Operation";
const MISSING: &str = "N/A";

/// A single benchmark result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchLine {
    pub operation: Operation,
    pub backend: Backend,
    pub ns_per_iter: u64,
    pub deviation: u64,
}

impl BenchLine {
    /// Compiles the bencher line pattern [`parse`](BenchLine::parse) expects.
    pub fn pattern() -> Result<Regex, ReportError> {
        Ok(Regex::new(BENCH_LINE)?)
    }

    /// Parses one bencher line with a pattern from [`pattern`](BenchLine::pattern).
    /// Lines for unknown operations or backends are `None`, like any other line.
    pub fn parse(line: &str, pattern: &Regex) -> Option<Self> {
        pattern
            .captures(line.trim())
            .and_then(|caps| Self::from_captures(&caps))
    }

    /// Benchmark id, `<Group>/<Backend>`.
    pub fn id(&self) -> String {
        format!("{}/{}", self.operation.group_name(), self.backend.id())
    }

    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        Some(Self {
            operation: Operation::from_group(&caps[1])?,
            backend: Backend::from_id(&caps[2])?,
            ns_per_iter: parse_number(&caps[3])?,
            deviation: parse_number(&caps[4])?,
        })
    }
}

fn parse_number(digits: &str) -> Option<u64> {
    digits.replace(',', "").parse().ok()
}

/// Results keyed by operation and backend.
#[derive(Debug, Clone, Default)]
pub struct ResultsTable {
    results: BTreeMap<(Operation, Backend), BenchLine>,
}

impl ResultsTable {
    /// Collects every bench line of `text`.
    ///
    /// Fails on the first line reporting a panic or an error, and when no
    /// result is found at all. A later line for the same benchmark replaces an
    /// earlier one.
    pub fn parse(text: &str) -> Result<Self, ReportError> {
        let bench = BenchLine::pattern()?;
        let failure = Regex::new(FAILURE_LINE)?;

        let mut table = ResultsTable::default();
        for line in text.lines().map(str::trim) {
            if failure.is_match(line) {
                return Err(ReportError::BenchmarkFailed {
                    line: line.to_string(),
                });
            }
            let Some(caps) = bench.captures(line) else {
                continue;
            };
            match BenchLine::from_captures(&caps) {
                Some(result) => table.insert(result),
                None => tracing::debug!(line, "skipping unknown benchmark"),
            }
        }

        if table.results.is_empty() {
            return Err(ReportError::NoResults);
        }
        tracing::info!(results = table.results.len(), "parsed benchmark results");
        Ok(table)
    }

    pub fn insert(&mut self, result: BenchLine) {
        self.results.insert((result.operation, result.backend), result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Nanoseconds per iteration of `operation` on `backend`. A zero time is
    /// no measurement and counts as missing.
    pub fn get(&self, operation: Operation, backend: Backend) -> Option<u64> {
        self.results
            .get(&(operation, backend))
            .map(|result| result.ns_per_iter)
            .filter(|&time| time > 0)
    }

    /// The faster of the two Neo4j modes for `operation`.
    pub fn fastest_neo4j(&self, operation: Operation) -> Option<u64> {
        Backend::ALL
            .into_iter()
            .filter(|backend| backend.is_neo4j())
            .filter_map(|backend| self.get(operation, backend))
            .min()
    }

    /// How many times faster `backend` is than the fastest Neo4j mode.
    pub fn speedup(&self, operation: Operation, backend: Backend) -> Option<f64> {
        let time = self.get(operation, backend)?;
        let neo4j = self.fastest_neo4j(operation)?;
        Some(neo4j as f64 / time as f64)
    }

    /// Ids of the benchmarks without a result.
    pub fn missing(&self) -> Vec<String> {
        Operation::ALL
            .into_iter()
            .flat_map(|operation| Backend::ALL.into_iter().map(move |backend| (operation, backend)))
            .filter(|&(operation, backend)| self.get(operation, backend).is_none())
            .map(|(operation, backend)| format!("{}/{}", operation.group_name(), backend.id()))
            .collect()
    }

    /// Fails with [`ReportError::Incomplete`] unless every cell has a result.
    pub fn check_complete(&self) -> Result<(), ReportError> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ReportError::Incomplete { missing })
        }
    }

    /// Renders the comparison table, one row per operation.
    pub fn to_markdown(&self) -> String {
        let first = Operation::ALL
            .into_iter()
            .map(|operation| operation.label().len())
            .chain([OPERATION_HEADER.len()])
            .max()
            .unwrap_or_default();
        let widths: Vec<usize> = Backend::ALL.iter().map(|backend| backend.label().len()).collect();

        let mut lines = Vec::with_capacity(Operation::ALL.len() + 2);
        lines.push(row(
            first,
            OPERATION_HEADER,
            &widths,
            Backend::ALL.iter().map(|backend| backend.label().to_string()),
        ));
        lines.push(separator(first, &widths));
        for operation in Operation::ALL {
            let cells = Backend::ALL.iter().map(|&backend| self.cell(operation, backend));
            lines.push(row(first, operation.label(), &widths, cells));
        }
        lines.join("\n")
    }

    fn cell(&self, operation: Operation, backend: Backend) -> String {
        let Some(time) = self.get(operation, backend) else {
            return MISSING.to_string();
        };
        if backend.is_neo4j() {
            return time.to_string();
        }
        match self.speedup(operation, backend) {
            Some(speedup) => format!("{time} ({speedup:.1}x faster)"),
            None => time.to_string(),
        }
    }
}

fn row(first: usize, label: &str, widths: &[usize], cells: impl Iterator<Item = String>) -> String {
    let mut line = format!("| {label:<first$} |");
    for (cell, &width) in cells.zip(widths) {
        line.push_str(&format!(" {cell:<width$} |"));
    }
    line
}

fn separator(first: usize, widths: &[usize]) -> String {
    let mut line = format!("|{}|", "-".repeat(first + 2));
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('|');
    }
    line
}
