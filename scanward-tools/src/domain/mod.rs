//! Tool domain types

pub mod entities;
pub mod traits;
pub mod value_objects;

pub use entities::{GitleaksSecret, SemgrepFinding, ToolFindings, TrivyVulnerability};
pub use traits::{ScanTool, ToolError};
pub use value_objects::{Severity, ToolKind, UnknownToolError};
