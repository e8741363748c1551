//! Scanward Tools - external security scanner runners
//!
//! Each supported scanner (trivy, gitleaks, semgrep) is run as an isolated
//! child process with its own timeout, and its native JSON report is
//! normalized into [`ToolFindings`].

pub mod domain;
pub mod infrastructure;

pub use domain::{
    GitleaksSecret, ScanTool, SemgrepFinding, Severity, ToolError, ToolFindings, ToolKind,
    TrivyVulnerability, UnknownToolError,
};
pub use infrastructure::{GitleaksExecutor, SemgrepExecutor, TrivyExecutor, configured_tools};
