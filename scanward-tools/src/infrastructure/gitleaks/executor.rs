//! Gitleaks secret detector executor

use async_trait::async_trait;
use scanward_core::config::GitleaksConfig;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

use super::output::GitleaksLeak;
use crate::domain::entities::{GitleaksSecret, ToolFindings};
use crate::domain::traits::{ScanTool, ToolError};
use crate::domain::value_objects::ToolKind;
use crate::infrastructure::process::{Invocation, interpret};

/// Default timeout for a gitleaks run (3 minutes)
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Report destination; gitleaks writes the JSON array there and logs to stderr.
const REPORT_PATH: &str = "/dev/stdout";

/// Runs `gitleaks detect` over the working tree of a workspace
pub struct GitleaksExecutor {
    executable: String,
    timeout: Duration,
    redact: bool,
    extra_args: Vec<String>,
}

impl GitleaksExecutor {
    pub fn new() -> Self {
        Self::with_config(&GitleaksConfig::default())
    }

    pub fn with_config(config: &GitleaksConfig) -> Self {
        Self {
            executable: config.tool.executable_or("gitleaks").to_string(),
            timeout: config.tool.timeout_or(DEFAULT_TIMEOUT_SECS),
            redact: config.redact,
            extra_args: config.tool.extra_args.clone(),
        }
    }

    fn invocation(&self, target: &Path) -> Invocation {
        let mut invocation = Invocation::new(self.executable.clone(), self.timeout)
            .arg("detect")
            .arg("--source")
            .arg(target.to_string_lossy())
            .args([
                "--no-git",
                "--report-format",
                "json",
                "--report-path",
                REPORT_PATH,
                "--exit-code",
                "0",
                "--no-banner",
            ]);
        if self.redact {
            invocation = invocation.arg("--redact");
        }
        invocation.args(self.extra_args.iter().cloned())
    }
}

impl Default for GitleaksExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a gitleaks JSON report array.
pub fn parse_report(
    stdout: &str,
    root: &Path,
    redact: bool,
) -> Result<Vec<GitleaksSecret>, ToolError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let leaks: Vec<GitleaksLeak> =
        serde_json::from_str(trimmed).map_err(|e| ToolError::OutputParse(e.to_string()))?;
    Ok(leaks
        .into_iter()
        .map(|leak| leak.normalize(root, redact))
        .collect())
}

#[async_trait]
impl ScanTool for GitleaksExecutor {
    fn kind(&self) -> ToolKind {
        ToolKind::Gitleaks
    }

    async fn check_installation(&self) -> Result<String, ToolError> {
        // gitleaks uses a `version` subcommand rather than a flag
        let output = Invocation::new(self.executable.clone(), self.timeout)
            .arg("version")
            .output(None)
            .await?;
        interpret(&output, |stdout| Ok(stdout.trim().to_string()))
    }

    #[instrument(skip(self), fields(tool = "gitleaks"))]
    async fn run(&self, target: &Path) -> Result<ToolFindings, ToolError> {
        let output = self.invocation(target).output(Some(target)).await?;
        let secrets = interpret(&output, |stdout| {
            parse_report(stdout, target, self.redact)
        })?;
        debug!(count = secrets.len(), "Gitleaks scan finished");
        Ok(ToolFindings::Gitleaks(secrets))
    }
}
