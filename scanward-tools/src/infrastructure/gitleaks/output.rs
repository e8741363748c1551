//! Gitleaks JSON report types
// cspell:ignore gitleaks

use serde::Deserialize;
use std::path::Path;

use crate::domain::entities::GitleaksSecret;
use crate::infrastructure::process::relative_to;

/// Placeholder gitleaks itself uses for redacted values
pub const REDACTED: &str = "REDACTED";

/// A single entry of the gitleaks report array
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GitleaksLeak {
    #[serde(rename = "RuleID")]
    pub rule_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub start_line: u32,
    #[serde(default)]
    pub r#match: String,
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub commit: String,
}

impl GitleaksLeak {
    /// Normalize one leak. With `redact` set the secret never survives in `match`.
    pub fn normalize(self, root: &Path, redact: bool) -> GitleaksSecret {
        let matched = if redact && !self.secret.is_empty() && self.secret != REDACTED {
            self.r#match.replace(&self.secret, REDACTED)
        } else {
            self.r#match
        };
        GitleaksSecret {
            rule_id: self.rule_id,
            description: self.description,
            file: relative_to(root, &self.file),
            start_line: self.start_line,
            matched,
            commit: Some(self.commit).filter(|c| !c.is_empty()),
        }
    }
}
