//! Shared fakes for orchestrator integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use scanward_orchestrator::application::{
    AdmissionPolicy, ExecuteScanUseCase, ScanQueryService, ScanWorkflow, StartScanUseCase,
};
use scanward_orchestrator::domain::{
    Credential, CredentialProvider, ScanId, ScanJob, ScanStatus, Workspace, WorkspaceError,
    WorkspaceProvider,
};
use scanward_orchestrator::infrastructure::job_queue::{ScanQueueHandle, ScanQueueReceiver};
use scanward_orchestrator::infrastructure::{
    InMemoryJobStore, JobStore, JobStoreError, StaticCredentialProvider, ToolRegistry, scan_queue,
};
use scanward_tools::{
    GitleaksSecret, ScanTool, SemgrepFinding, ToolError, ToolFindings, ToolKind,
    TrivyVulnerability,
};

pub const TOKEN: &str = "ghp_test_token";

/// Job store wrapper that records every persisted status.
pub struct RecordingJobStore {
    inner: InMemoryJobStore,
    pub writes: Mutex<Vec<(ScanId, ScanStatus)>>,
}

impl RecordingJobStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryJobStore::new(Duration::from_secs(3600), 100),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub async fn statuses_for(&self, id: &ScanId) -> Vec<ScanStatus> {
        self.writes
            .lock()
            .await
            .iter()
            .filter(|(written, _)| written == id)
            .map(|(_, status)| *status)
            .collect()
    }
}

#[async_trait]
impl JobStore for RecordingJobStore {
    async fn create(&self, job: &ScanJob) -> Result<(), JobStoreError> {
        self.inner.create(job).await?;
        self.writes.lock().await.push((job.id.clone(), job.status));
        Ok(())
    }

    async fn get(&self, id: &ScanId) -> Result<Option<ScanJob>, JobStoreError> {
        self.inner.get(id).await
    }

    async fn update(&self, job: &ScanJob) -> Result<(), JobStoreError> {
        self.inner.update(job).await?;
        self.writes.lock().await.push((job.id.clone(), job.status));
        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ScanId>, JobStoreError> {
        self.inner.list_recent(limit).await
    }
}

/// Store whose backend is always down.
pub struct UnavailableJobStore;

#[async_trait]
impl JobStore for UnavailableJobStore {
    async fn create(&self, _job: &ScanJob) -> Result<(), JobStoreError> {
        Err(JobStoreError::Unavailable("connection refused".into()))
    }

    async fn get(&self, _id: &ScanId) -> Result<Option<ScanJob>, JobStoreError> {
        Err(JobStoreError::Unavailable("connection refused".into()))
    }

    async fn update(&self, _job: &ScanJob) -> Result<(), JobStoreError> {
        Err(JobStoreError::Unavailable("connection refused".into()))
    }

    async fn list_recent(&self, _limit: usize) -> Result<Vec<ScanId>, JobStoreError> {
        Err(JobStoreError::Unavailable("connection refused".into()))
    }

    async fn health_check(&self) -> Result<(), JobStoreError> {
        Err(JobStoreError::Unavailable("connection refused".into()))
    }
}

/// Workspace provider creating an empty temp dir, or failing.
pub struct FakeWorkspaceProvider {
    failure: Option<WorkspaceError>,
    pub requests: Mutex<Vec<(String, Credential)>>,
}

impl FakeWorkspaceProvider {
    pub fn ok() -> Self {
        Self {
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: WorkspaceError) -> Self {
        Self {
            failure: Some(error),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl WorkspaceProvider for FakeWorkspaceProvider {
    async fn acquire(
        &self,
        repo_full_name: &str,
        credential: &Credential,
    ) -> Result<Workspace, WorkspaceError> {
        self.requests
            .lock()
            .await
            .push((repo_full_name.to_string(), credential.clone()));
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let dir = tempfile::Builder::new()
            .prefix("scanward-ws-")
            .tempdir()
            .map_err(|e| WorkspaceError::Io(e.to_string()))?;
        std::fs::write(dir.path().join("README.md"), "# test\n")
            .map_err(|e| WorkspaceError::Io(e.to_string()))?;
        Ok(Workspace::new(dir, Some("0123456789abcdef".into())))
    }
}

/// What a fake tool does when run
#[derive(Clone)]
pub enum FakeBehavior {
    Findings(ToolFindings),
    Error(ToolError),
    /// Delete the workspace directory, then report no findings
    DeleteWorkspace,
    /// Wait before reporting no findings
    Slow(Duration),
}

pub struct FakeTool {
    kind: ToolKind,
    behavior: FakeBehavior,
}

impl FakeTool {
    pub fn new(kind: ToolKind, behavior: FakeBehavior) -> Arc<dyn ScanTool> {
        Arc::new(Self { kind, behavior })
    }

    fn empty(&self) -> ToolFindings {
        match self.kind {
            ToolKind::Trivy => ToolFindings::Trivy(Vec::new()),
            ToolKind::Gitleaks => ToolFindings::Gitleaks(Vec::new()),
            ToolKind::Semgrep => ToolFindings::Semgrep(Vec::new()),
        }
    }
}

#[async_trait]
impl ScanTool for FakeTool {
    fn kind(&self) -> ToolKind {
        self.kind
    }

    async fn check_installation(&self) -> Result<String, ToolError> {
        match &self.behavior {
            FakeBehavior::Error(ToolError::NotInstalled { executable }) => {
                Err(ToolError::NotInstalled {
                    executable: executable.clone(),
                })
            }
            _ => Ok(format!("{} 1.0.0", self.kind)),
        }
    }

    async fn run(&self, target: &Path) -> Result<ToolFindings, ToolError> {
        match &self.behavior {
            FakeBehavior::Findings(findings) => Ok(findings.clone()),
            FakeBehavior::Error(err) => Err(err.clone()),
            FakeBehavior::DeleteWorkspace => {
                let _ = std::fs::remove_dir_all(target);
                Ok(self.empty())
            }
            FakeBehavior::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(self.empty())
            }
        }
    }
}

pub fn trivy_vuln() -> TrivyVulnerability {
    TrivyVulnerability {
        id: "CVE-2021-23337".into(),
        severity: "HIGH".into(),
        title: "lodash: command injection".into(),
        description: "Command injection via template".into(),
        pkg_name: "lodash".into(),
        primary_url: Some("https://avd.aquasec.com/nvd/cve-2021-23337".into()),
        installed_version: Some("4.17.20".into()),
        fixed_version: Some("4.17.21".into()),
        target: Some("package-lock.json".into()),
    }
}

pub fn gitleaks_secret() -> GitleaksSecret {
    GitleaksSecret {
        rule_id: "github-pat".into(),
        description: "GitHub Personal Access Token".into(),
        file: ".env".into(),
        start_line: 1,
        matched: "TOKEN=REDACTED".into(),
        commit: None,
    }
}

pub fn semgrep_finding() -> SemgrepFinding {
    SemgrepFinding {
        rule_id: "python.lang.security.audit.eval-detected".into(),
        message: "Detected the use of eval()".into(),
        severity: "WARNING".into(),
        path: "app.py".into(),
        start_line: 3,
    }
}

/// Registry where every tool reports one finding.
pub fn healthy_tools() -> ToolRegistry {
    ToolRegistry::new([
        FakeTool::new(
            ToolKind::Trivy,
            FakeBehavior::Findings(ToolFindings::Trivy(vec![trivy_vuln()])),
        ),
        FakeTool::new(
            ToolKind::Gitleaks,
            FakeBehavior::Findings(ToolFindings::Gitleaks(vec![gitleaks_secret()])),
        ),
        FakeTool::new(
            ToolKind::Semgrep,
            FakeBehavior::Findings(ToolFindings::Semgrep(vec![semgrep_finding()])),
        ),
    ])
}

pub fn admission_policy() -> AdmissionPolicy {
    AdmissionPolicy {
        default_owner: Some("acme".into()),
        window: 20,
    }
}

/// Admission wired to an in-memory store; the receiver is returned so tests
/// control whether the queue stays open.
pub fn start_scan_use_case(
    store: Arc<dyn JobStore>,
) -> (StartScanUseCase, ScanQueueHandle, ScanQueueReceiver) {
    let (queue, receiver) = scan_queue(16);
    let credentials: Arc<dyn CredentialProvider> = Arc::new(StaticCredentialProvider::new(TOKEN));
    let use_case = StartScanUseCase::new(store, queue.clone(), credentials, admission_policy());
    (use_case, queue, receiver)
}

pub fn execute_use_case(
    store: Arc<dyn JobStore>,
    workspaces: Arc<dyn WorkspaceProvider>,
    tools: ToolRegistry,
) -> ExecuteScanUseCase {
    ExecuteScanUseCase::new(ScanWorkflow::new(store), workspaces, Arc::new(tools))
}

pub fn query_service(store: Arc<dyn JobStore>) -> ScanQueryService {
    ScanQueryService::new(store, 20, Some("acme".to_string()))
}

/// Poll the store until the job reaches a terminal state.
pub async fn wait_for_terminal(store: &dyn JobStore, id: &ScanId) -> ScanJob {
    for _ in 0..200 {
        if let Some(job) = store.get(id).await.expect("store read")
            && job.status.is_terminal()
        {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("scan {id} did not finish in time");
}
