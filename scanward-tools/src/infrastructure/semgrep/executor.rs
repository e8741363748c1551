//! Semgrep OSS executor
//!
//! Runs `semgrep scan` via subprocess against a checked-out workspace with a
//! registry or local rule configuration and parses its JSON output.

use async_trait::async_trait;
use scanward_core::config::SemgrepConfig;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::output::SemgrepOutput;
use crate::domain::entities::{SemgrepFinding, ToolFindings};
use crate::domain::traits::{ScanTool, ToolError};
use crate::domain::value_objects::ToolKind;
use crate::infrastructure::process::{Invocation, interpret};

/// Default timeout for Semgrep execution (10 minutes)
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Semgrep executor for running analysis
pub struct SemgrepExecutor {
    executable: String,
    timeout: Duration,
    rules: String,
    extra_args: Vec<String>,
}

impl SemgrepExecutor {
    /// Create a new Semgrep executor with default config
    pub fn new() -> Self {
        Self::with_config(&SemgrepConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(config: &SemgrepConfig) -> Self {
        Self {
            executable: config.tool.executable_or("semgrep").to_string(),
            timeout: config.tool.timeout_or(DEFAULT_TIMEOUT_SECS),
            rules: config.config.clone(),
            extra_args: config.tool.extra_args.clone(),
        }
    }

    fn invocation(&self, target: &Path) -> Invocation {
        Invocation::new(self.executable.clone(), self.timeout)
            .args(["scan", "--json", "--quiet", "--metrics=off", "--config"])
            .arg(self.rules.clone())
            .args(self.extra_args.iter().cloned())
            .arg(target.to_string_lossy())
    }
}

impl Default for SemgrepExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse Semgrep JSON output into findings.
pub fn parse_output(stdout: &str, root: &Path) -> Result<Vec<SemgrepFinding>, ToolError> {
    let output: SemgrepOutput =
        serde_json::from_str(stdout).map_err(|e| ToolError::OutputParse(e.to_string()))?;

    for err in &output.errors {
        warn!(
            level = ?err.level,
            message = ?err.message,
            "Semgrep reported an analysis error"
        );
    }

    Ok(output
        .results
        .into_iter()
        .map(|result| result.normalize(root))
        .collect())
}

#[async_trait]
impl ScanTool for SemgrepExecutor {
    fn kind(&self) -> ToolKind {
        ToolKind::Semgrep
    }

    /// Check if Semgrep is installed and accessible
    async fn check_installation(&self) -> Result<String, ToolError> {
        Invocation::new(self.executable.clone(), self.timeout)
            .version()
            .await
    }

    #[instrument(skip(self), fields(tool = "semgrep"))]
    async fn run(&self, target: &Path) -> Result<ToolFindings, ToolError> {
        let output = self.invocation(target).output(Some(target)).await?;
        let findings = interpret(&output, |stdout| parse_output(stdout, target))?;
        debug!(count = findings.len(), "Semgrep scan finished");
        Ok(ToolFindings::Semgrep(findings))
    }
}
