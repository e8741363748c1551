//! Normalized scanner findings

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::value_objects::{Severity, ToolKind};

/// Dependency vulnerability reported by trivy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrivyVulnerability {
    /// CVE or advisory identifier
    #[schema(example = "CVE-2021-23337")]
    pub id: String,
    #[schema(example = "HIGH")]
    pub severity: String,
    pub title: String,
    pub description: String,
    #[schema(example = "lodash")]
    pub pkg_name: String,
    pub primary_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_version: Option<String>,
    /// Manifest or lockfile the package was found in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Secret reported by gitleaks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GitleaksSecret {
    #[schema(example = "aws-access-token")]
    pub rule_id: String,
    pub description: String,
    pub file: String,
    pub start_line: u32,
    /// Matched text; secret values are redacted unless redaction is disabled
    #[serde(rename = "match")]
    pub matched: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// Static analysis finding reported by semgrep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SemgrepFinding {
    #[schema(example = "python.lang.security.audit.eval-detected")]
    pub rule_id: String,
    pub message: String,
    #[schema(example = "ERROR")]
    pub severity: String,
    pub path: String,
    pub start_line: u32,
}

/// Output of one tool run, tagged by the tool that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolFindings {
    Trivy(Vec<TrivyVulnerability>),
    Gitleaks(Vec<GitleaksSecret>),
    Semgrep(Vec<SemgrepFinding>),
}

impl ToolFindings {
    pub fn kind(&self) -> ToolKind {
        match self {
            Self::Trivy(_) => ToolKind::Trivy,
            Self::Gitleaks(_) => ToolKind::Gitleaks,
            Self::Semgrep(_) => ToolKind::Semgrep,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Trivy(items) => items.len(),
            Self::Gitleaks(items) => items.len(),
            Self::Semgrep(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Normalized severity of every finding. Leaked secrets always count as high.
    pub fn severities(&self) -> Vec<Severity> {
        match self {
            Self::Trivy(items) => items
                .iter()
                .map(|v| Severity::from_trivy(&v.severity))
                .collect(),
            Self::Gitleaks(items) => vec![Severity::High; items.len()],
            Self::Semgrep(items) => items
                .iter()
                .map(|f| Severity::from_semgrep(&f.severity))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> GitleaksSecret {
        GitleaksSecret {
            rule_id: "generic-api-key".into(),
            description: "Generic API Key".into(),
            file: "config/settings.py".into(),
            start_line: 12,
            matched: "API_KEY = \"REDACTED\"".into(),
            commit: None,
        }
    }

    #[test]
    fn test_gitleaks_secret_serializes_match_key() {
        let value = serde_json::to_value(secret()).unwrap();
        assert_eq!(value["ruleId"], "generic-api-key");
        assert_eq!(value["startLine"], 12);
        assert_eq!(value["match"], "API_KEY = \"REDACTED\"");
        assert!(value.get("commit").is_none());
    }

    #[test]
    fn test_findings_kind_and_severities() {
        let findings = ToolFindings::Gitleaks(vec![secret(), secret()]);
        assert_eq!(findings.kind(), ToolKind::Gitleaks);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings.severities(), vec![Severity::High, Severity::High]);

        let empty = ToolFindings::Semgrep(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.kind(), ToolKind::Semgrep);
    }
}
