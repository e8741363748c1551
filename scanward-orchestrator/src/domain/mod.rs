//! Orchestrator domain layer

pub mod entities;
pub mod services;
pub mod value_objects;

pub use entities::{ResultsSummary, ScanJob, ScanResults, SeverityBreakdown};
pub use services::{CredentialProvider, Workspace, WorkspaceError, WorkspaceProvider};
pub use value_objects::{
    Credential, RepoName, RepoNameError, ScanId, ScanStatus, StatusTransition, TransitionError,
};
