//! Scanward Orchestrator - scan job lifecycle and HTTP API
//!
//! Admits scan requests with single-flight per repository, queues them for a
//! bounded worker pool, clones each repository into a private workspace, runs
//! the requested scanners concurrently and persists every state transition to
//! the job store, which clients poll over HTTP.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::{
    AdmissionPolicy, ExecuteScanUseCase, ScanQueryService, ScanWorkflow, StartScanError,
    StartScanUseCase, WorkflowError,
};
pub use domain::{
    Credential, CredentialProvider, RepoName, ScanId, ScanJob, ScanResults, ScanStatus, Workspace,
    WorkspaceError, WorkspaceProvider,
};
pub use infrastructure::{
    DragonflyJobStore, EnvCredentialProvider, GitWorkspaceConfig, GitWorkspaceProvider,
    InMemoryJobStore, JobStore, JobStoreError, ScanQueueHandle, ScanWorkerContext,
    StaticCredentialProvider, ToolRegistry, scan_queue, spawn_scan_worker_pool,
};
pub use presentation::{ApiDoc, ScanApiState, create_router};
