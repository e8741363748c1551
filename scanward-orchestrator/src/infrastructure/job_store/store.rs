use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use scanward_core::infrastructure::cache::{CacheError, DragonflyCache};

use crate::domain::{ScanId, ScanJob};

/// Job persistence errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobStoreError {
    #[error("Scan not found: {0}")]
    NotFound(ScanId),
    #[error("Serialization failed: {0}")]
    Serialization(String),
    #[error("Job store unavailable: {0}")]
    Unavailable(String),
}

impl From<CacheError> for JobStoreError {
    fn from(error: CacheError) -> Self {
        match error {
            CacheError::Serialization(e) => Self::Serialization(e.to_string()),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

/// Scan job storage interface.
///
/// Every record expires after the store's TTL. A most-recent-first index of
/// job ids is kept alongside; it may reference expired records, which read as
/// not found.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a new job and push it on the recency index.
    async fn create(&self, job: &ScanJob) -> Result<(), JobStoreError>;

    async fn get(&self, id: &ScanId) -> Result<Option<ScanJob>, JobStoreError>;

    /// Overwrite an existing job. Fails with `NotFound` if it has expired.
    async fn update(&self, job: &ScanJob) -> Result<(), JobStoreError>;

    /// Up to `limit` ids, newest first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<ScanId>, JobStoreError>;

    /// Newest live job for the qualified `owner/name`, walking the recency index.
    ///
    /// Matches on the same key as admission's single-flight check, so a repository
    /// requested as `api` and as `acme/api` is one repository.
    async fn find_latest_by_repo(
        &self,
        repo_full_name: &str,
    ) -> Result<Option<ScanJob>, JobStoreError> {
        for id in self.list_recent(usize::MAX).await? {
            if let Some(job) = self.get(&id).await?
                && job.repo_full_name == repo_full_name
            {
                return Ok(Some(job));
            }
        }
        Ok(None)
    }

    /// Verify the backing storage is reachable.
    async fn health_check(&self) -> Result<(), JobStoreError> {
        Ok(())
    }
}

/// Dragonfly-backed job store; one JSON value per job plus a capped list index.
pub struct DragonflyJobStore {
    cache: Arc<DragonflyCache>,
    key_prefix: String,
    ttl: Duration,
    recent_capacity: usize,
}

impl DragonflyJobStore {
    pub fn new(
        cache: Arc<DragonflyCache>,
        key_prefix: impl Into<String>,
        ttl: Duration,
        recent_capacity: usize,
    ) -> Self {
        Self {
            cache,
            key_prefix: key_prefix.into(),
            ttl,
            recent_capacity: recent_capacity.max(1),
        }
    }

    fn job_key(&self, id: &ScanId) -> String {
        format!("{}:scan:{}", self.key_prefix, id)
    }

    fn recent_key(&self) -> String {
        format!("{}:scans:recent", self.key_prefix)
    }
}

#[async_trait]
impl JobStore for DragonflyJobStore {
    async fn create(&self, job: &ScanJob) -> Result<(), JobStoreError> {
        self.cache
            .set_json(&self.job_key(&job.id), job, self.ttl)
            .await?;
        self.cache
            .push_capped(
                &self.recent_key(),
                job.id.as_str(),
                self.recent_capacity,
                self.ttl,
            )
            .await?;

        info!(
            scan_id = %job.id,
            repo = %job.repo_name,
            "Scan job stored with TTL {}s",
            self.ttl.as_secs()
        );
        Ok(())
    }

    async fn get(&self, id: &ScanId) -> Result<Option<ScanJob>, JobStoreError> {
        let job: Option<ScanJob> = self.cache.get_json(&self.job_key(id)).await?;
        if job.is_none() {
            debug!(scan_id = %id, "Scan job not found in Dragonfly");
        }
        Ok(job)
    }

    async fn update(&self, job: &ScanJob) -> Result<(), JobStoreError> {
        let replaced = self
            .cache
            .replace_json(&self.job_key(&job.id), job, self.ttl)
            .await?;
        if !replaced {
            return Err(JobStoreError::NotFound(job.id.clone()));
        }
        debug!(scan_id = %job.id, status = %job.status, "Scan job updated");
        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ScanId>, JobStoreError> {
        let ids = self
            .cache
            .list_head(&self.recent_key(), limit.min(self.recent_capacity))
            .await?;
        Ok(ids.into_iter().map(ScanId::from).collect())
    }

    async fn health_check(&self) -> Result<(), JobStoreError> {
        self.cache.ping().await.map_err(JobStoreError::from)
    }
}
