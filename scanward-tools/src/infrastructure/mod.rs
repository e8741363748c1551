//! Subprocess-backed scanner implementations

pub mod gitleaks;
pub mod process;
pub mod semgrep;
pub mod trivy;

use scanward_core::config::ToolsConfig;
use std::sync::Arc;

use crate::domain::traits::ScanTool;

pub use gitleaks::GitleaksExecutor;
pub use semgrep::SemgrepExecutor;
pub use trivy::TrivyExecutor;

/// Build a runner for every tool enabled in configuration, in canonical order.
pub fn configured_tools(config: &ToolsConfig) -> Vec<Arc<dyn ScanTool>> {
    let mut tools: Vec<Arc<dyn ScanTool>> = Vec::new();
    if config.trivy.tool.enabled {
        tools.push(Arc::new(TrivyExecutor::with_config(&config.trivy)));
    }
    if config.gitleaks.tool.enabled {
        tools.push(Arc::new(GitleaksExecutor::with_config(&config.gitleaks)));
    }
    if config.semgrep.tool.enabled {
        tools.push(Arc::new(SemgrepExecutor::with_config(&config.semgrep)));
    }
    tools
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ToolKind;

    #[test]
    fn test_configured_tools_skips_disabled() {
        let mut config = ToolsConfig::default();
        config.gitleaks.tool.enabled = false;

        let kinds: Vec<ToolKind> = configured_tools(&config).iter().map(|t| t.kind()).collect();
        assert_eq!(kinds, vec![ToolKind::Trivy, ToolKind::Semgrep]);
    }
}
