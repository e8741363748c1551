//! Test configuration and server builders

#![allow(dead_code)]

use axum_test::TestServer;
use git2::{Repository, Signature};
use std::path::Path;
use std::sync::Once;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

use scanward::{Config, create_app};
use scanward_core::config::StoreBackend;

/// Environment variable the test configuration reads the clone token from
pub const TOKEN_ENV_VAR: &str = "SCANWARD_TEST_CLONE_TOKEN";

fn export_token() {
    static EXPORT: Once = Once::new();
    EXPORT.call_once(|| {
        // SAFETY: set once, before any test reads it through the credential provider.
        unsafe { std::env::set_var(TOKEN_ENV_VAR, "ghp_test_token") };
    });
}

/// Test configuration builder for creating consistent test configurations
pub struct TestConfigBuilder {
    config: Config,
}

impl TestConfigBuilder {
    /// In-memory store, local git remotes and scanner binaries that do not exist
    pub fn new(remotes: &Path, checkouts: &Path) -> Self {
        export_token();

        let mut config = Config::default();
        config.store.backend = StoreBackend::Memory;
        config.git.base_url = format!("file://{}", remotes.display());
        config.git.default_owner = Some("acme".to_string());
        config.git.checkout_parent = Some(checkouts.to_path_buf());
        config.git.clone_timeout_seconds = 30;
        config.credentials.env_var = TOKEN_ENV_VAR.to_string();
        config.tools.trivy.tool.executable = Some("scanward-test-missing-trivy".to_string());
        config.tools.gitleaks.tool.executable = Some("scanward-test-missing-gitleaks".to_string());
        config.tools.semgrep.tool.executable = Some("scanward-test-missing-semgrep".to_string());
        config.server.enable_docs = true;
        Self { config }
    }

    pub fn with_semgrep_disabled(mut self) -> Self {
        self.config.tools.semgrep.tool.enabled = false;
        self
    }

    pub fn with_credential_var(mut self, env_var: &str) -> Self {
        self.config.credentials.env_var = env_var.to_string();
        self
    }

    pub fn with_docs(mut self, enabled: bool) -> Self {
        self.config.server.enable_docs = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}

/// Local remotes and checkout parent, removed when dropped
pub struct TestDirs {
    pub remotes: TempDir,
    pub checkouts: TempDir,
}

impl TestDirs {
    pub fn new() -> Self {
        Self {
            remotes: TempDir::new().unwrap(),
            checkouts: TempDir::new().unwrap(),
        }
    }

    pub fn config(&self) -> TestConfigBuilder {
        TestConfigBuilder::new(self.remotes.path(), self.checkouts.path())
    }

    /// Create `owner/repo` with one commit; returns the commit id.
    pub fn add_repository(&self, full_name: &str) -> String {
        let path = self.remotes.path().join(full_name);
        std::fs::create_dir_all(&path).unwrap();
        let repo = Repository::init(&path).unwrap();

        std::fs::write(path.join("package.json"), "{\"name\":\"demo\"}\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("package.json")).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let signature = Signature::now("Scan Test", "scan-test@example.com").unwrap();
        repo.commit(Some("HEAD"), &signature, &signature, "initial", &tree, &[])
            .unwrap()
            .to_string()
    }

    /// Number of workspaces currently present under the checkout parent
    pub fn workspace_count(&self) -> usize {
        std::fs::read_dir(self.checkouts.path()).unwrap().count()
    }
}

/// Create a test server from a configuration
pub async fn test_server(config: Config) -> TestServer {
    let app = create_app(config).await.expect("application starts");
    TestServer::new(app.router).expect("test server starts")
}

/// Poll a scan until it leaves the active states
pub async fn wait_for_terminal(server: &TestServer, scan_id: &str) -> serde_json::Value {
    let poll = async {
        loop {
            let job: serde_json::Value = server.get(&format!("/api/v1/scans/{scan_id}")).await.json();
            if job["status"] == "completed" || job["status"] == "failed" {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    };
    timeout(Duration::from_secs(30), poll)
        .await
        .expect("scan finishes in time")
}
