//! Semgrep output parsing types
//!
//! These types match the JSON output format of the Semgrep CLI.

use serde::Deserialize;
use std::path::Path;

use crate::domain::entities::SemgrepFinding;
use crate::infrastructure::process::relative_to;

/// Root Semgrep JSON output
#[derive(Debug, Clone, Deserialize)]
pub struct SemgrepOutput {
    /// List of results (findings)
    #[serde(default)]
    pub results: Vec<SemgrepResult>,
    /// Errors encountered during analysis
    #[serde(default)]
    pub errors: Vec<SemgrepOutputError>,
    /// Semgrep version
    #[serde(default)]
    pub version: Option<String>,
}

/// A single Semgrep result (finding)
#[derive(Debug, Clone, Deserialize)]
pub struct SemgrepResult {
    /// Rule ID that triggered
    pub check_id: String,
    /// File path where finding was detected
    pub path: String,
    /// Start position
    pub start: Position,
    /// Additional result information
    #[serde(default)]
    pub extra: SemgrepResultExtra,
}

/// Position in file
#[derive(Debug, Clone, Deserialize)]
pub struct Position {
    /// Line number (1-based)
    pub line: u32,
    #[serde(default)]
    pub col: u32,
}

/// Extra information in a result
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SemgrepResultExtra {
    /// Message from the rule
    #[serde(default)]
    pub message: String,
    /// Severity level
    #[serde(default)]
    pub severity: String,
}

/// Non-fatal error reported alongside results
#[derive(Debug, Clone, Deserialize)]
pub struct SemgrepOutputError {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SemgrepResult {
    pub fn normalize(self, root: &Path) -> SemgrepFinding {
        SemgrepFinding {
            rule_id: self.check_id,
            message: self.extra.message,
            severity: if self.extra.severity.is_empty() {
                "INFO".to_string()
            } else {
                self.extra.severity
            },
            path: relative_to(root, &self.path),
            start_line: self.start.line,
        }
    }
}
