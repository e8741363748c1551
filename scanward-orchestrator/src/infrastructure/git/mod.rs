//! Git-backed scan workspaces

mod service;

pub use service::{GitWorkspaceConfig, GitWorkspaceProvider, WORKSPACE_PREFIX};
