//! Orchestrator domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use scanward_tools::{
    GitleaksSecret, SemgrepFinding, Severity, ToolError, ToolFindings, ToolKind,
    TrivyVulnerability,
};

use super::value_objects::{RepoName, ScanId, ScanStatus, StatusTransition, TransitionError};

/// A security scan of one repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanJob {
    pub id: ScanId,
    /// Name as requested by the client
    #[schema(example = "web-app")]
    pub repo_name: String,
    #[schema(example = "acme/web-app")]
    pub repo_full_name: String,
    pub status: ScanStatus,
    pub tools: Vec<ToolKind>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<ScanResults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// HEAD commit of the scanned checkout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    #[serde(default)]
    pub transitions: Vec<StatusTransition>,
}

impl ScanJob {
    /// New `pending` job. `tools` must already be validated and ordered.
    pub fn new(repo: &RepoName, tools: Vec<ToolKind>) -> Self {
        Self {
            id: ScanId::generate(),
            repo_name: repo.name().to_string(),
            repo_full_name: repo.full_name().to_string(),
            status: ScanStatus::Pending,
            tools,
            started_at: Utc::now(),
            completed_at: None,
            results: None,
            error: None,
            commit_sha: None,
            transitions: Vec::new(),
        }
    }

    /// Move to `target`, recording the audit entry. Entering a terminal state
    /// stamps `completed_at`.
    pub fn transition(
        &mut self,
        target: ScanStatus,
        reason: Option<String>,
    ) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(target) {
            return Err(TransitionError {
                from: self.status,
                to: target,
            });
        }

        let now = Utc::now();
        self.transitions.push(StatusTransition {
            from: self.status,
            to: target,
            at: now,
            reason,
        });
        self.status = target;
        if target.is_terminal() {
            self.completed_at = Some(now);
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// Per-tool outcomes of a scan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trivy: Option<Vec<TrivyVulnerability>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gitleaks: Option<Vec<GitleaksSecret>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semgrep: Option<Vec<SemgrepFinding>>,
    /// Tool name to failure message
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    #[schema(value_type = Object)]
    pub tool_errors: BTreeMap<ToolKind, String>,
}

impl ScanResults {
    /// Record one tool's outcome. Exactly one of findings or error is kept per tool.
    pub fn record(&mut self, kind: ToolKind, outcome: Result<ToolFindings, ToolError>) {
        match outcome {
            Ok(findings) if findings.kind() == kind => self.record_findings(findings),
            Ok(findings) => self.record_error(
                kind,
                format!("Runner returned {} findings", findings.kind()),
            ),
            Err(err) => self.record_error(kind, err.to_string()),
        }
    }

    pub fn record_findings(&mut self, findings: ToolFindings) {
        let kind = findings.kind();
        self.tool_errors.remove(&kind);
        match findings {
            ToolFindings::Trivy(items) => self.trivy = Some(items),
            ToolFindings::Gitleaks(items) => self.gitleaks = Some(items),
            ToolFindings::Semgrep(items) => self.semgrep = Some(items),
        }
    }

    pub fn record_error(&mut self, kind: ToolKind, message: impl Into<String>) {
        match kind {
            ToolKind::Trivy => self.trivy = None,
            ToolKind::Gitleaks => self.gitleaks = None,
            ToolKind::Semgrep => self.semgrep = None,
        }
        self.tool_errors.insert(kind, message.into());
    }

    pub fn has_findings_for(&self, kind: ToolKind) -> bool {
        match kind {
            ToolKind::Trivy => self.trivy.is_some(),
            ToolKind::Gitleaks => self.gitleaks.is_some(),
            ToolKind::Semgrep => self.semgrep.is_some(),
        }
    }

    pub fn has_error_for(&self, kind: ToolKind) -> bool {
        self.tool_errors.contains_key(&kind)
    }

    fn findings_for(&self, kind: ToolKind) -> Option<ToolFindings> {
        match kind {
            ToolKind::Trivy => self.trivy.clone().map(ToolFindings::Trivy),
            ToolKind::Gitleaks => self.gitleaks.clone().map(ToolFindings::Gitleaks),
            ToolKind::Semgrep => self.semgrep.clone().map(ToolFindings::Semgrep),
        }
    }

    /// Finding counts per tool and by normalized severity.
    pub fn summary(&self) -> ResultsSummary {
        let mut summary = ResultsSummary::default();
        for kind in ToolKind::ALL {
            let Some(findings) = self.findings_for(kind) else {
                continue;
            };
            summary.by_tool.insert(kind, findings.len());
            summary.total_findings += findings.len();
            for severity in findings.severities() {
                summary.by_severity.add(severity);
            }
        }
        summary.tools_failed = self.tool_errors.len();
        summary
    }
}

/// Aggregate counts over a scan's results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultsSummary {
    pub total_findings: usize,
    #[schema(value_type = Object)]
    pub by_tool: BTreeMap<ToolKind, usize>,
    pub by_severity: SeverityBreakdown,
    pub tools_failed: usize,
}

/// Severity breakdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SeverityBreakdown {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
    pub unknown: usize,
}

impl SeverityBreakdown {
    fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::Info => self.info += 1,
            Severity::Unknown => self.unknown += 1,
        }
    }
}
