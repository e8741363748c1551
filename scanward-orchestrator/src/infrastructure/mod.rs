//! Orchestrator infrastructure layer

pub mod credentials;
pub mod git;
pub mod job_queue;
pub mod job_store;
pub mod tool_registry;

pub use credentials::{EnvCredentialProvider, StaticCredentialProvider};
pub use git::{GitWorkspaceConfig, GitWorkspaceProvider};
pub use job_queue::{
    QueueError, QueueSlot, QueuedScan, ScanQueueHandle, ScanQueueReceiver, ScanWorkerContext, scan_queue,
    spawn_scan_worker_pool,
};
pub use job_store::{DragonflyJobStore, InMemoryJobStore, JobStore, JobStoreError};
pub use tool_registry::{ToolAvailability, ToolRegistry};
