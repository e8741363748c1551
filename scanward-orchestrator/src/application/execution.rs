//! Scan execution: clone, run tools, finalize

use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

use scanward_tools::{ToolError, ToolKind};

use super::workflow::{ScanWorkflow, WorkflowError};
use crate::domain::{Credential, ScanJob, ScanResults, Workspace, WorkspaceProvider};
use crate::infrastructure::tool_registry::ToolRegistry;

/// Message recorded when the checkout disappears while tools are running
pub const WORKSPACE_LOST_ERROR: &str = "Workspace directory disappeared during scan";

/// Drives one scan from `pending` to a terminal state.
pub struct ExecuteScanUseCase {
    workflow: ScanWorkflow,
    workspaces: Arc<dyn WorkspaceProvider>,
    tools: Arc<ToolRegistry>,
}

impl ExecuteScanUseCase {
    pub fn new(
        workflow: ScanWorkflow,
        workspaces: Arc<dyn WorkspaceProvider>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            workflow,
            workspaces,
            tools,
        }
    }

    /// Run the scan and return the job in its final persisted state.
    ///
    /// Clone and tool failures are recorded on the job; only workflow errors
    /// (invalid transitions, store failures) are returned.
    #[instrument(skip(self, job, credential), fields(scan_id = %job.id, repo = %job.repo_full_name))]
    pub async fn execute(
        &self,
        mut job: ScanJob,
        credential: &Credential,
    ) -> Result<ScanJob, WorkflowError> {
        self.workflow.begin_clone(&mut job).await?;

        let workspace = match self
            .workspaces
            .acquire(&job.repo_full_name, credential)
            .await
        {
            Ok(workspace) => workspace,
            Err(err) => {
                warn!(error = %err, "Workspace acquisition failed");
                self.workflow.fail(&mut job, &err.to_string(), None).await?;
                return Ok(job);
            }
        };

        let outcome = self.scan_workspace(&mut job, &workspace).await;
        workspace.release();
        outcome.map(|()| job)
    }

    async fn scan_workspace(
        &self,
        job: &mut ScanJob,
        workspace: &Workspace,
    ) -> Result<(), WorkflowError> {
        self.workflow
            .begin_scan(job, workspace.head_commit().map(str::to_string))
            .await?;

        let results = self.run_tools(&job.tools, workspace.path()).await;

        if workspace.is_intact() {
            self.workflow.complete(job, results).await
        } else {
            self.workflow
                .fail(job, WORKSPACE_LOST_ERROR, Some(results))
                .await
        }
    }

    /// Run every requested tool concurrently; each outcome lands in its own slot.
    async fn run_tools(&self, tools: &[ToolKind], target: &Path) -> ScanResults {
        let outcomes = join_all(tools.iter().map(|&kind| async move {
            let started = Instant::now();
            let outcome = match self.tools.get(kind) {
                Some(tool) => tool.run(target).await,
                None => Err(ToolError::NotRegistered(kind)),
            };
            match &outcome {
                Ok(findings) => info!(
                    tool = %kind,
                    findings = findings.len(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Tool finished"
                ),
                Err(err) => warn!(
                    tool = %kind,
                    error = %err,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Tool unavailable for this scan"
                ),
            }
            (kind, outcome)
        }))
        .await;

        let mut results = ScanResults::default();
        for (kind, outcome) in outcomes {
            results.record(kind, outcome);
        }
        results
    }
}
