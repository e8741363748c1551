//! Scan admission: validation, single-flight check, enqueue

use std::sync::Arc;
use tracing::info;

use scanward_tools::ToolKind;

use crate::domain::{CredentialProvider, RepoName, RepoNameError, ScanId, ScanJob};
use crate::infrastructure::job_queue::{QueuedScan, ScanQueueHandle};
use crate::infrastructure::job_store::{JobStore, JobStoreError};

/// Reasons a scan request is rejected
#[derive(Debug, thiserror::Error)]
pub enum StartScanError {
    #[error(transparent)]
    InvalidRepoName(#[from] RepoNameError),

    #[error("No valid tools requested; supported tools are trivy, gitleaks and semgrep")]
    NoValidTools,

    #[error("No repository credential configured for {0}")]
    MissingCredential(String),

    #[error("A scan is already running for this repository")]
    AlreadyRunning { scan_id: ScanId },

    #[error("Job store error: {0}")]
    Store(#[from] JobStoreError),

    #[error("Scan queue unavailable: {0}")]
    QueueUnavailable(String),
}

/// Admission settings
#[derive(Debug, Clone)]
pub struct AdmissionPolicy {
    /// Owner prefixed to bare repository names
    pub default_owner: Option<String>,
    /// Number of most recent jobs checked for an active scan of the same repository
    pub window: usize,
}

/// Admits scan requests: at most one active scan per repository.
///
/// The active-scan check and the job creation are not atomic; two concurrent
/// requests for the same repository can both be admitted.
pub struct StartScanUseCase {
    job_store: Arc<dyn JobStore>,
    queue: ScanQueueHandle,
    credentials: Arc<dyn CredentialProvider>,
    policy: AdmissionPolicy,
}

impl StartScanUseCase {
    pub fn new(
        job_store: Arc<dyn JobStore>,
        queue: ScanQueueHandle,
        credentials: Arc<dyn CredentialProvider>,
        policy: AdmissionPolicy,
    ) -> Self {
        Self {
            job_store,
            queue,
            credentials,
            policy,
        }
    }

    /// Admit a scan of `repo_name` with the requested tools (all tools when `None`).
    pub async fn execute(
        &self,
        repo_name: &str,
        tools: Option<&[String]>,
    ) -> Result<ScanJob, StartScanError> {
        let repo = RepoName::parse(repo_name, self.policy.default_owner.as_deref())?;

        let tools = match tools {
            Some(names) => ToolKind::select(names),
            None => ToolKind::ALL.to_vec(),
        };
        if tools.is_empty() {
            return Err(StartScanError::NoValidTools);
        }

        let credential = self
            .credentials
            .credential(repo.full_name())
            .ok_or_else(|| StartScanError::MissingCredential(repo.full_name().to_string()))?;

        if let Some(active) = self.find_active(&repo).await? {
            info!(
                scan_id = %active.id,
                repo = %repo.full_name(),
                status = %active.status,
                "Rejecting scan: repository already has an active scan"
            );
            return Err(StartScanError::AlreadyRunning { scan_id: active.id });
        }

        // Room in the queue is held before the job exists, so a stored job is always queued
        let slot = self
            .queue
            .try_reserve()
            .map_err(|err| StartScanError::QueueUnavailable(err.to_string()))?;

        let job = ScanJob::new(&repo, tools);
        self.job_store.create(&job).await?;
        slot.send(QueuedScan {
            job: job.clone(),
            credential,
        });

        info!(
            scan_id = %job.id,
            repo = %job.repo_full_name,
            tools = ?job.tools,
            "Scan admitted"
        );
        Ok(job)
    }

    /// First non-terminal job for the same repository among the most recent entries.
    async fn find_active(&self, repo: &RepoName) -> Result<Option<ScanJob>, JobStoreError> {
        for id in self.job_store.list_recent(self.policy.window).await? {
            if let Some(job) = self.job_store.get(&id).await?
                && job.repo_full_name == repo.full_name()
                && job.is_active()
            {
                return Ok(Some(job));
            }
        }
        Ok(None)
    }
}
