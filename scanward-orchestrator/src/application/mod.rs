//! Orchestrator application layer

pub mod admission;
pub mod execution;
pub mod queries;
pub mod workflow;

pub use admission::{AdmissionPolicy, StartScanError, StartScanUseCase};
pub use execution::{ExecuteScanUseCase, WORKSPACE_LOST_ERROR};
pub use queries::ScanQueryService;
pub use workflow::{ScanWorkflow, WorkflowError};
