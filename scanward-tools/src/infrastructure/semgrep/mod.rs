//! Semgrep static analysis engine

pub mod executor;
pub mod output;

pub use executor::SemgrepExecutor;
