//! Orchestrator value objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Opaque scan identifier: 12 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(example = "3f9a1c2b7d4e")]
pub struct ScanId(String);

impl ScanId {
    pub const LEN: usize = 12;

    pub fn generate() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self(simple[..Self::LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ScanId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ScanId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scan job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// Accepted, waiting for a worker
    Pending,
    /// Repository clone in progress
    Cloning,
    /// Tools running against the workspace
    Scanning,
    /// Tools ran; individual tools may still have failed
    Completed,
    /// Orchestration failed (clone error, workspace corruption)
    Failed,
}

impl ScanStatus {
    /// Returns the set of valid target states from the current state.
    ///
    /// ```text
    /// Pending ──► Cloning ──► Scanning ──► Completed
    ///   │           │           │
    ///   └───────────┴───────────┴──► Failed
    /// ```
    pub fn valid_transitions(&self) -> &'static [ScanStatus] {
        match self {
            Self::Pending => &[Self::Cloning, Self::Failed],
            Self::Cloning => &[Self::Scanning, Self::Failed],
            Self::Scanning => &[Self::Completed, Self::Failed],
            Self::Completed | Self::Failed => &[],
        }
    }

    /// Check whether transitioning to `target` is allowed from the current state.
    pub fn can_transition_to(&self, target: ScanStatus) -> bool {
        self.valid_transitions().contains(&target)
    }

    /// Whether this status represents a terminal (final) state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Position along the lifecycle; terminal states share the highest rank.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Cloning => 1,
            Self::Scanning => 2,
            Self::Completed | Self::Failed => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Cloning => "cloning",
            Self::Scanning => "scanning",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorded state transition for a scan job (audit trail).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusTransition {
    pub from: ScanStatus,
    pub to: ScanStatus,
    pub at: DateTime<Utc>,
    /// Human-readable reason or context for the transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Error returned when an invalid status transition is attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid scan transition from {from} to {to}")]
pub struct TransitionError {
    pub from: ScanStatus,
    pub to: ScanStatus,
}

/// Repository reference as requested and fully qualified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoName {
    name: String,
    full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoNameError {
    #[error("Repository name is required")]
    Empty,
    #[error("Invalid repository name: {0}")]
    Malformed(String),
    #[error("Repository name {0} has no owner and no default owner is configured")]
    MissingOwner(String),
}

impl RepoName {
    /// Validate `raw` and qualify it with `default_owner` when it has no owner segment.
    pub fn parse(raw: &str, default_owner: Option<&str>) -> Result<Self, RepoNameError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(RepoNameError::Empty);
        }

        let segments: Vec<&str> = name.split('/').collect();
        if segments.len() > 2 || !segments.iter().all(|s| is_valid_segment(s)) {
            return Err(RepoNameError::Malformed(name.to_string()));
        }

        let full_name = if segments.len() == 2 {
            name.to_string()
        } else {
            match default_owner.map(str::trim).filter(|o| !o.is_empty()) {
                Some(owner) if is_valid_segment(owner) => format!("{owner}/{name}"),
                Some(owner) => return Err(RepoNameError::Malformed(owner.to_string())),
                None => return Err(RepoNameError::MissingOwner(name.to_string())),
            }
        };

        Ok(Self {
            name: name.to_string(),
            full_name,
        })
    }

    /// Name as requested
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `owner/repo`
    pub fn full_name(&self) -> &str {
        &self.full_name
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Access token used to clone a repository. Never serialized or logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}
