//! Scanner abstraction

use async_trait::async_trait;
use std::path::Path;

use super::entities::ToolFindings;
use super::value_objects::ToolKind;

/// Reasons a tool could not produce findings.
///
/// Every variant means "this tool is unavailable for this scan"; none of them
/// affects other tools.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("{executable} not found in PATH")]
    NotInstalled { executable: String },

    #[error("Failed to start {executable}: {message}")]
    Spawn { executable: String, message: String },

    #[error("Timed out after {0} seconds")]
    Timeout(u64),

    #[error("Exited with {status}: {stderr}")]
    ExecutionFailed { status: String, stderr: String },

    #[error("Failed to parse output: {0}")]
    OutputParse(String),

    #[error("No runner registered for {0}")]
    NotRegistered(ToolKind),
}

/// An external security scanner run against a checked-out workspace.
#[async_trait]
pub trait ScanTool: Send + Sync {
    /// Which tool this is
    fn kind(&self) -> ToolKind;

    /// Check the binary is installed; returns its version string.
    async fn check_installation(&self) -> Result<String, ToolError>;

    /// Scan `target` and return normalized findings.
    async fn run(&self, target: &Path) -> Result<ToolFindings, ToolError>;
}
