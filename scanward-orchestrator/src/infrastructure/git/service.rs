use std::path::{Path, PathBuf};
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use git2::{Cred, CredentialType, FetchOptions, RemoteCallbacks, build::RepoBuilder, opts};
use tracing::{debug, info, warn};

use scanward_core::config::GitConfig;

use crate::domain::{Credential, Workspace, WorkspaceError, WorkspaceProvider};

/// Prefix of every workspace directory
pub const WORKSPACE_PREFIX: &str = "scanward-ws-";

/// Configuration for the Git workspace provider.
#[derive(Debug, Clone)]
pub struct GitWorkspaceConfig {
    /// Remote base, e.g. `https://github.com` or `file:///srv/mirrors`.
    pub base_url: String,
    /// Parent directory for checkouts. Defaults to std::env::temp_dir().
    pub checkout_parent: Option<PathBuf>,
    /// Upper bound for the whole clone.
    pub clone_timeout: Duration,
    /// Shallow clone depth for network remotes.
    pub depth: Option<i32>,
}

impl From<&GitConfig> for GitWorkspaceConfig {
    fn from(config: &GitConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            checkout_parent: config.checkout_parent.clone(),
            clone_timeout: Duration::from_secs(config.clone_timeout_seconds),
            depth: config.clone_depth,
        }
    }
}

/// Clones repositories into per-scan temporary directories with libgit2.
#[derive(Debug)]
pub struct GitWorkspaceProvider {
    checkout_parent: PathBuf,
    config: GitWorkspaceConfig,
}

impl GitWorkspaceProvider {
    /// Create a new provider, creating the checkout parent if needed.
    pub fn new(config: GitWorkspaceConfig) -> std::io::Result<Self> {
        let checkout_parent = config
            .checkout_parent
            .clone()
            .unwrap_or_else(std::env::temp_dir);

        if !checkout_parent.exists() {
            std::fs::create_dir_all(&checkout_parent)?;
        }

        Ok(Self {
            checkout_parent,
            config,
        })
    }

    /// Remote URL for `owner/repo` under the configured base.
    pub fn remote_url(&self, repo_full_name: &str) -> Result<String, WorkspaceError> {
        let base = self.config.base_url.trim_end_matches('/');
        if base.starts_with("https://") {
            Ok(format!("{base}/{repo_full_name}.git"))
        } else if base.starts_with("file://") {
            Ok(format!("{base}/{repo_full_name}"))
        } else {
            Err(WorkspaceError::UnsupportedScheme(base.to_string()))
        }
    }

    fn perform_clone(
        destination: &Path,
        repository_url: &str,
        token: &str,
        depth: Option<i32>,
        deadline: Instant,
        timed_out: &AtomicBool,
    ) -> Result<Option<String>, git2::Error> {
        let mut callbacks = RemoteCallbacks::new();
        let token = token.to_string();
        callbacks.credentials(move |_url, username_from_url, allowed| {
            if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
                let username = username_from_url.unwrap_or("x-access-token");
                Cred::userpass_plaintext(username, &token)
            } else {
                Cred::default()
            }
        });
        // Returning false aborts the transfer
        callbacks.transfer_progress(|_progress| {
            if Instant::now() >= deadline {
                timed_out.store(true, Ordering::SeqCst);
                false
            } else {
                true
            }
        });

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(callbacks);
        fetch_options.download_tags(git2::AutotagOption::None);
        // Local transports do not support shallow fetches
        if let Some(depth) = depth
            && !repository_url.starts_with("file://")
        {
            fetch_options.depth(depth);
        }

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_options);
        let repo = builder.clone(repository_url, destination)?;
        let head = repo
            .head()
            .ok()
            .and_then(|h| h.target())
            .map(|oid| oid.to_string());
        Ok(head)
    }

    fn configure_git_timeouts(timeout: Duration) {
        static CONFIGURE: Once = Once::new();
        CONFIGURE.call_once(|| {
            if let Err(e) = Self::set_server_timeouts(timeout) {
                warn!(error = %e, "Failed to configure libgit2 server timeouts");
            }
        });
    }

    fn set_server_timeouts(timeout: Duration) -> Result<(), git2::Error> {
        let timeout_ms = timeout.as_millis().clamp(1, i32::MAX as u128) as i32;
        // SAFETY: libgit2 global options are set once, before the first clone starts.
        unsafe {
            opts::set_server_connect_timeout_in_milliseconds(timeout_ms)?;
            opts::set_server_timeout_in_milliseconds(timeout_ms)?;
        }
        Ok(())
    }
}

#[async_trait]
impl WorkspaceProvider for GitWorkspaceProvider {
    async fn acquire(
        &self,
        repo_full_name: &str,
        credential: &Credential,
    ) -> Result<Workspace, WorkspaceError> {
        let repository_url = self.remote_url(repo_full_name)?;

        let checkout_dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(&self.checkout_parent)
            .map_err(|e| WorkspaceError::Io(e.to_string()))?;
        let clone_timeout = self.config.clone_timeout;
        let depth = self.config.depth;
        let token = credential.expose().to_string();

        info!(repo = %repo_full_name, path = %checkout_dir.path().display(), "Starting Git clone");

        Self::configure_git_timeouts(clone_timeout);

        // The checkout directory moves into the blocking task so it is removed
        // only after libgit2 has stopped writing to it.
        let task = tokio::task::spawn_blocking(move || {
            let timed_out = AtomicBool::new(false);
            let deadline = Instant::now() + clone_timeout;
            let result = Self::perform_clone(
                checkout_dir.path(),
                &repository_url,
                &token,
                depth,
                deadline,
                &timed_out,
            );
            (result, timed_out.load(Ordering::SeqCst), checkout_dir)
        });

        let (checkout_dir, head_commit) = match tokio::time::timeout(clone_timeout, task).await {
            Err(_) => return Err(WorkspaceError::Timeout(clone_timeout.as_secs())),
            Ok(Err(join_err)) => return Err(WorkspaceError::CloneFailed(join_err.to_string())),
            Ok(Ok((Err(_), true, _))) => {
                return Err(WorkspaceError::Timeout(clone_timeout.as_secs()));
            }
            Ok(Ok((Err(git_err), false, _))) => {
                warn!(repo = %repo_full_name, error = %git_err.message(), "Git clone failed");
                return Err(WorkspaceError::CloneFailed(git_err.message().to_string()));
            }
            Ok(Ok((Ok(head), _, checkout_dir))) => (checkout_dir, head),
        };

        debug!(repo = %repo_full_name, commit = ?head_commit, "Git clone completed");
        Ok(Workspace::new(checkout_dir, head_commit))
    }
}
