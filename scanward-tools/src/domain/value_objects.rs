//! Tool value objects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// External scanner identifier.
///
/// Declaration order is the canonical execution and reporting order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Dependency vulnerability scanner
    Trivy,
    /// Secret detector
    Gitleaks,
    /// Static analysis engine
    Semgrep,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [ToolKind::Trivy, ToolKind::Gitleaks, ToolKind::Semgrep];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trivy => "trivy",
            Self::Gitleaks => "gitleaks",
            Self::Semgrep => "semgrep",
        }
    }

    /// Filter free-form tool names down to the supported set.
    ///
    /// Unknown names are dropped, duplicates collapse, and the result follows
    /// canonical order regardless of input order.
    pub fn select<I, S>(names: I) -> Vec<ToolKind>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected: Vec<ToolKind> = names
            .into_iter()
            .filter_map(|name| name.as_ref().parse().ok())
            .collect();
        selected.sort();
        selected.dedup();
        selected
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unsupported tool: {0}")]
pub struct UnknownToolError(pub String);

impl FromStr for ToolKind {
    type Err = UnknownToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trivy" => Ok(Self::Trivy),
            "gitleaks" => Ok(Self::Gitleaks),
            "semgrep" => Ok(Self::Semgrep),
            _ => Err(UnknownToolError(s.to_string())),
        }
    }
}

/// Normalized severity used for summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
    Unknown,
}

impl Severity {
    /// Trivy reports CRITICAL/HIGH/MEDIUM/LOW/UNKNOWN.
    pub fn from_trivy(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "CRITICAL" => Self::Critical,
            "HIGH" => Self::High,
            "MEDIUM" => Self::Medium,
            "LOW" => Self::Low,
            _ => Self::Unknown,
        }
    }

    /// Semgrep reports ERROR/WARNING/INFO (and CRITICAL..LOW for newer rule packs).
    pub fn from_semgrep(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "CRITICAL" => Self::Critical,
            "ERROR" | "HIGH" => Self::High,
            "WARNING" | "MEDIUM" => Self::Medium,
            "LOW" => Self::Low,
            "INFO" => Self::Info,
            _ => Self::Unknown,
        }
    }
}
