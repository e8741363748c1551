//! Read-only scan status queries

use std::sync::Arc;
use tracing::debug;

use crate::domain::{RepoName, ScanId, ScanJob};
use crate::infrastructure::job_store::{JobStore, JobStoreError};

/// Polling entry points for scan status. Nothing here mutates jobs.
#[derive(Clone)]
pub struct ScanQueryService {
    job_store: Arc<dyn JobStore>,
    list_limit: usize,
    default_owner: Option<String>,
}

impl ScanQueryService {
    pub fn new(
        job_store: Arc<dyn JobStore>,
        list_limit: usize,
        default_owner: Option<String>,
    ) -> Self {
        Self {
            job_store,
            list_limit: list_limit.max(1),
            default_owner,
        }
    }

    pub async fn get(&self, id: &ScanId) -> Result<Option<ScanJob>, JobStoreError> {
        self.job_store.get(id).await
    }

    /// Most recent live job for the repository. Bare names are qualified with the
    /// default owner the way admission qualifies them; a name admission would
    /// reject has no jobs.
    pub async fn latest_for_repo(&self, repo_name: &str) -> Result<Option<ScanJob>, JobStoreError> {
        let repo = match RepoName::parse(repo_name, self.default_owner.as_deref()) {
            Ok(repo) => repo,
            Err(err) => {
                debug!(repo = %repo_name, error = %err, "Repository lookup with invalid name");
                return Ok(None);
            }
        };
        self.job_store.find_latest_by_repo(repo.full_name()).await
    }

    /// Most recent jobs, newest first. `limit` is clamped to the configured maximum
    /// and expired entries are skipped.
    pub async fn list_recent(&self, limit: Option<usize>) -> Result<Vec<ScanJob>, JobStoreError> {
        let limit = limit.unwrap_or(self.list_limit).clamp(1, self.list_limit);
        let ids = self.job_store.list_recent(limit).await?;

        let mut jobs = Vec::with_capacity(ids.len());
        for id in ids {
            match self.job_store.get(&id).await? {
                Some(job) => jobs.push(job),
                None => debug!(scan_id = %id, "Skipping expired scan in recency index"),
            }
        }
        Ok(jobs)
    }

    pub fn list_limit(&self) -> usize {
        self.list_limit
    }
}
