//! Trivy output parsing types
//!
//! These types match the subset of `trivy fs --format json` output we read.
// cspell:ignore trivy

use serde::Deserialize;

use crate::domain::entities::TrivyVulnerability;

/// Root Trivy JSON report
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrivyReport {
    /// One entry per scanned target (lockfile, manifest, image layer)
    #[serde(default)]
    pub results: Option<Vec<TrivyResult>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrivyResult {
    #[serde(default)]
    pub target: String,
    /// Trivy emits `null` when the target has no vulnerabilities
    #[serde(default)]
    pub vulnerabilities: Option<Vec<TrivyRawVulnerability>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrivyRawVulnerability {
    #[serde(rename = "VulnerabilityID")]
    pub vulnerability_id: String,
    #[serde(rename = "PkgName", default)]
    pub pkg_name: String,
    #[serde(rename = "InstalledVersion", default)]
    pub installed_version: Option<String>,
    #[serde(rename = "FixedVersion", default)]
    pub fixed_version: Option<String>,
    #[serde(rename = "Severity", default)]
    pub severity: String,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "PrimaryURL", default)]
    pub primary_url: Option<String>,
}

impl TrivyReport {
    pub fn into_vulnerabilities(self) -> Vec<TrivyVulnerability> {
        self.results
            .unwrap_or_default()
            .into_iter()
            .flat_map(|result| {
                let target = result.target;
                result
                    .vulnerabilities
                    .unwrap_or_default()
                    .into_iter()
                    .map(move |raw| raw.normalize(&target))
            })
            .collect()
    }
}

impl TrivyRawVulnerability {
    fn normalize(self, target: &str) -> TrivyVulnerability {
        let title = self
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.vulnerability_id.clone());
        TrivyVulnerability {
            id: self.vulnerability_id,
            severity: if self.severity.is_empty() {
                "UNKNOWN".to_string()
            } else {
                self.severity
            },
            title,
            description: self.description.unwrap_or_default(),
            pkg_name: self.pkg_name,
            primary_url: self.primary_url,
            installed_version: self.installed_version.filter(|v| !v.is_empty()),
            fixed_version: self.fixed_version.filter(|v| !v.is_empty()),
            target: Some(target.to_string()).filter(|t| !t.is_empty()),
        }
    }
}
