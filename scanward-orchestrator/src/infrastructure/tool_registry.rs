//! Registry of available scanner runners

use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;

use scanward_tools::{ScanTool, ToolError, ToolKind};

/// Maps each tool kind to its runner.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<ToolKind, Arc<dyn ScanTool>>,
}

/// Installation probe result for one tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolAvailability {
    pub kind: ToolKind,
    pub version: Result<String, ToolError>,
}

impl ToolRegistry {
    pub fn new(tools: impl IntoIterator<Item = Arc<dyn ScanTool>>) -> Self {
        Self {
            tools: tools.into_iter().map(|tool| (tool.kind(), tool)).collect(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn ScanTool>) {
        self.tools.insert(tool.kind(), tool);
    }

    pub fn get(&self, kind: ToolKind) -> Option<Arc<dyn ScanTool>> {
        self.tools.get(&kind).cloned()
    }

    /// Registered kinds in canonical order
    pub fn kinds(&self) -> Vec<ToolKind> {
        self.tools.keys().copied().collect()
    }

    /// Probe every registered tool's binary concurrently.
    pub async fn availability(&self) -> Vec<ToolAvailability> {
        join_all(self.tools.iter().map(|(kind, tool)| async move {
            ToolAvailability {
                kind: *kind,
                version: tool.check_installation().await,
            }
        }))
        .await
    }
}
