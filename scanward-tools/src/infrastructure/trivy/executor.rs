//! Trivy filesystem scanner executor

use async_trait::async_trait;
use scanward_core::config::TrivyConfig;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

use super::output::TrivyReport;
use crate::domain::entities::{ToolFindings, TrivyVulnerability};
use crate::domain::traits::{ScanTool, ToolError};
use crate::domain::value_objects::ToolKind;
use crate::infrastructure::process::{Invocation, interpret};

/// Default timeout for a trivy run (5 minutes)
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Runs `trivy fs` against a workspace
pub struct TrivyExecutor {
    executable: String,
    timeout: Duration,
    extra_args: Vec<String>,
}

impl TrivyExecutor {
    pub fn new() -> Self {
        Self::with_config(&TrivyConfig::default())
    }

    pub fn with_config(config: &TrivyConfig) -> Self {
        Self {
            executable: config.tool.executable_or("trivy").to_string(),
            timeout: config.tool.timeout_or(DEFAULT_TIMEOUT_SECS),
            extra_args: config.tool.extra_args.clone(),
        }
    }

    fn invocation(&self, target: &Path) -> Invocation {
        Invocation::new(self.executable.clone(), self.timeout)
            .args(["fs", "--format", "json", "--quiet", "--scanners", "vuln"])
            .args(self.extra_args.iter().cloned())
            .arg(target.to_string_lossy())
    }
}

impl Default for TrivyExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a trivy JSON report. Empty output means nothing was scanned.
pub fn parse_report(stdout: &str) -> Result<Vec<TrivyVulnerability>, ToolError> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    let report: TrivyReport =
        serde_json::from_str(stdout).map_err(|e| ToolError::OutputParse(e.to_string()))?;
    Ok(report.into_vulnerabilities())
}

#[async_trait]
impl ScanTool for TrivyExecutor {
    fn kind(&self) -> ToolKind {
        ToolKind::Trivy
    }

    async fn check_installation(&self) -> Result<String, ToolError> {
        Invocation::new(self.executable.clone(), self.timeout)
            .version()
            .await
    }

    #[instrument(skip(self), fields(tool = "trivy"))]
    async fn run(&self, target: &Path) -> Result<ToolFindings, ToolError> {
        let output = self.invocation(target).output(Some(target)).await?;
        let vulnerabilities = interpret(&output, parse_report)?;
        debug!(count = vulnerabilities.len(), "Trivy scan finished");
        Ok(ToolFindings::Trivy(vulnerabilities))
    }
}
