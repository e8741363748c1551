//! Scan Workflow: centralised state-machine controller for scan jobs.
//!
//! Every status transition goes through [`ScanWorkflow`], which validates the
//! transition against [`ScanStatus`], records an audit entry on the
//! [`ScanJob`] and persists the whole record before returning.
//!
//! ```text
//! Worker              ScanWorkflow          JobStore
//!   │                     │                    │
//!   ├─ begin_clone() ────►│── update ─────────►│   pending  → cloning
//!   ├─ begin_scan() ─────►│── update ─────────►│   cloning  → scanning
//!   ├─ complete() ───────►│── update ─────────►│   scanning → completed
//!   └─ fail() ───────────►│── update ─────────►│   *        → failed
//! ```

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{ScanJob, ScanResults, ScanStatus, TransitionError};
use crate::infrastructure::job_store::{JobStore, JobStoreError};

/// Errors from the workflow layer.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Invalid state transition: {0}")]
    InvalidTransition(#[from] TransitionError),

    #[error("Persistence error: {0}")]
    Store(#[from] JobStoreError),
}

/// Centralised scan lifecycle controller.
#[derive(Clone)]
pub struct ScanWorkflow {
    job_store: Arc<dyn JobStore>,
}

impl ScanWorkflow {
    pub fn new(job_store: Arc<dyn JobStore>) -> Self {
        Self { job_store }
    }

    /// Transition to [`ScanStatus::Cloning`] and persist.
    pub async fn begin_clone(&self, job: &mut ScanJob) -> Result<(), WorkflowError> {
        job.transition(ScanStatus::Cloning, Some("Worker picked up scan".into()))?;
        self.job_store.update(job).await?;

        info!(scan_id = %job.id, repo = %job.repo_name, "Scan transitioned to cloning");
        Ok(())
    }

    /// Transition to [`ScanStatus::Scanning`], recording the checked-out commit.
    pub async fn begin_scan(
        &self,
        job: &mut ScanJob,
        commit_sha: Option<String>,
    ) -> Result<(), WorkflowError> {
        job.transition(
            ScanStatus::Scanning,
            Some(format!("Running {} tool(s)", job.tools.len())),
        )?;
        job.commit_sha = commit_sha;
        self.job_store.update(job).await?;

        info!(scan_id = %job.id, commit = ?job.commit_sha, "Scan transitioned to scanning");
        Ok(())
    }

    /// Transition to [`ScanStatus::Completed`] with per-tool results and persist.
    pub async fn complete(
        &self,
        job: &mut ScanJob,
        results: ScanResults,
    ) -> Result<(), WorkflowError> {
        let summary = results.summary();
        job.transition(
            ScanStatus::Completed,
            Some(format!(
                "Completed with {} findings, {} tool error(s)",
                summary.total_findings, summary.tools_failed
            )),
        )?;
        job.results = Some(results);
        self.job_store.update(job).await?;

        info!(
            scan_id = %job.id,
            findings = summary.total_findings,
            tools_failed = summary.tools_failed,
            "Scan transitioned to completed"
        );
        Ok(())
    }

    /// Transition to [`ScanStatus::Failed`] with an error and persist.
    ///
    /// `results` carries whatever tool outcomes were gathered before failing.
    pub async fn fail(
        &self,
        job: &mut ScanJob,
        error: &str,
        results: Option<ScanResults>,
    ) -> Result<(), WorkflowError> {
        job.transition(ScanStatus::Failed, Some(format!("Scan failed: {error}")))?;
        job.error = Some(error.to_string());
        if results.is_some() {
            job.results = results;
        }
        self.job_store.update(job).await?;

        warn!(scan_id = %job.id, error, "Scan transitioned to failed");
        Ok(())
    }
}
