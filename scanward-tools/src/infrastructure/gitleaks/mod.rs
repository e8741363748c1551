//! Gitleaks secret detector

pub mod executor;
pub mod output;

pub use executor::GitleaksExecutor;
