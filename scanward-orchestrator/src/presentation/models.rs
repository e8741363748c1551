//! API request and response models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use scanward_tools::ToolKind;

use crate::domain::{
    ResultsSummary, ScanId, ScanJob, ScanResults, ScanStatus, StatusTransition,
};

/// Request body for triggering a scan
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartScanRequest {
    /// `repo` (default owner applied) or `owner/repo`
    #[schema(example = "acme/web-app")]
    pub repo_name: String,
    /// Subset of trivy, gitleaks, semgrep; all tools when omitted
    #[serde(default)]
    #[schema(example = json!(["trivy", "gitleaks"]))]
    pub tools: Option<Vec<String>>,
}

/// Response for an admitted scan
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanAcceptedResponse {
    pub scan_id: ScanId,
    pub status: ScanStatus,
}

/// Scan results with an aggregate summary
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanResultsResponse {
    #[serde(flatten)]
    pub results: ScanResults,
    pub summary: ResultsSummary,
}

/// Scan job as exposed to clients
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanJobResponse {
    pub id: ScanId,
    pub repo_name: String,
    pub repo_full_name: String,
    pub status: ScanStatus,
    pub tools: Vec<ToolKind>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<ScanResultsResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    pub transitions: Vec<StatusTransition>,
}

impl From<ScanJob> for ScanJobResponse {
    fn from(job: ScanJob) -> Self {
        Self {
            id: job.id,
            repo_name: job.repo_name,
            repo_full_name: job.repo_full_name,
            status: job.status,
            tools: job.tools,
            started_at: job.started_at,
            completed_at: job.completed_at,
            results: job.results.map(|results| ScanResultsResponse {
                summary: results.summary(),
                results,
            }),
            error: job.error,
            commit_sha: job.commit_sha,
            transitions: job.transitions,
        }
    }
}

/// Recent scans, newest first
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ScanListResponse {
    pub scans: Vec<ScanJobResponse>,
}

/// Query parameters for `GET /api/v1/scans`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScanQuery {
    /// Fetch one scan by id
    pub id: Option<String>,
    /// Fetch the latest scan of a repository (name as requested)
    pub repo: Option<String>,
    /// Maximum number of scans to list
    pub limit: Option<usize>,
}

/// Error body
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[schema(example = "A scan is already running for this repository")]
    pub error: String,
    /// Active scan id when the request conflicts with a running scan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_id: Option<ScanId>,
}

/// Health of one dependency
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ComponentHealth {
    #[schema(example = "ok")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Installation status of one scanner binary
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ToolHealth {
    pub tool: ToolKind,
    pub installed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` when the job store is reachable, `degraded` otherwise
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "0.3.0")]
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub store: ComponentHealth,
    pub tools: Vec<ToolHealth>,
}
