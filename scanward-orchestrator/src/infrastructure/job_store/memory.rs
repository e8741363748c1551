//! In-process job store for single-instance deployments and tests

use async_trait::async_trait;
use moka::future::Cache;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use super::store::{JobStore, JobStoreError};
use crate::domain::{ScanId, ScanJob};

/// Records live in a moka cache with a time-to-live; the recency index is a
/// bounded deque of ids.
pub struct InMemoryJobStore {
    jobs: Cache<ScanId, ScanJob>,
    recent: Mutex<VecDeque<ScanId>>,
    recent_capacity: usize,
}

impl InMemoryJobStore {
    pub fn new(ttl: Duration, recent_capacity: usize) -> Self {
        Self {
            jobs: Cache::builder().time_to_live(ttl).build(),
            recent: Mutex::new(VecDeque::new()),
            recent_capacity: recent_capacity.max(1),
        }
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: &ScanJob) -> Result<(), JobStoreError> {
        self.jobs.insert(job.id.clone(), job.clone()).await;

        let mut recent = self.recent.lock().await;
        recent.push_front(job.id.clone());
        recent.truncate(self.recent_capacity);

        debug!(scan_id = %job.id, repo = %job.repo_name, "Scan job stored in memory");
        Ok(())
    }

    async fn get(&self, id: &ScanId) -> Result<Option<ScanJob>, JobStoreError> {
        Ok(self.jobs.get(id).await)
    }

    async fn update(&self, job: &ScanJob) -> Result<(), JobStoreError> {
        if self.jobs.get(&job.id).await.is_none() {
            return Err(JobStoreError::NotFound(job.id.clone()));
        }
        self.jobs.insert(job.id.clone(), job.clone()).await;
        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ScanId>, JobStoreError> {
        let recent = self.recent.lock().await;
        Ok(recent.iter().take(limit).cloned().collect())
    }
}
