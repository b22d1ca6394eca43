use thiserror::Error;

/// Reasons a results table cannot be produced.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("benchmark run failed: {line}")]
    BenchmarkFailed { line: String },
    #[error("no benchmark results found")]
    NoResults,
    #[error("missing results for {}", .missing.join(", "))]
    Incomplete { missing: Vec<String> },
}
