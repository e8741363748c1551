//! Orchestrator domain services

use async_trait::async_trait;
use std::path::Path;
use tempfile::TempDir;
use tracing::{debug, warn};

use super::value_objects::Credential;

/// A checked-out repository owned by one scan.
///
/// The directory is deleted when the workspace is dropped or released.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    head_commit: Option<String>,
}

impl Workspace {
    pub fn new(dir: TempDir, head_commit: Option<String>) -> Self {
        Self { dir, head_commit }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// HEAD commit SHA of the checkout, when resolvable
    pub fn head_commit(&self) -> Option<&str> {
        self.head_commit.as_deref()
    }

    /// Whether the checkout directory still exists on disk.
    pub fn is_intact(&self) -> bool {
        self.dir.path().is_dir()
    }

    /// Delete the workspace now, logging rather than returning failures.
    pub fn release(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!(path = %path.display(), "Workspace removed"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove workspace"),
        }
    }
}

/// Workspace acquisition errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkspaceError {
    #[error("Unsupported repository URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Clone failed: {0}")]
    CloneFailed(String),

    #[error("Clone timed out after {0} seconds")]
    Timeout(u64),

    #[error("Workspace IO error: {0}")]
    Io(String),
}

/// Provides isolated checkouts of repositories
#[async_trait]
pub trait WorkspaceProvider: Send + Sync {
    /// Clone `repo_full_name` (`owner/repo`) into a fresh private directory.
    async fn acquire(
        &self,
        repo_full_name: &str,
        credential: &Credential,
    ) -> Result<Workspace, WorkspaceError>;
}

/// Source of repository access tokens
pub trait CredentialProvider: Send + Sync {
    /// Token for the repository `key` (`owner/repo`), if one is available.
    fn credential(&self, key: &str) -> Option<Credential>;
}
