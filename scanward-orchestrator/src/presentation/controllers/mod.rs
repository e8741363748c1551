//! Scan API controllers

pub mod health;
pub mod scans;

use std::sync::Arc;

use crate::application::{ScanQueryService, StartScanUseCase};
use crate::infrastructure::job_store::JobStore;
use crate::infrastructure::tool_registry::ToolRegistry;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct ScanApiState {
    pub start_scan_use_case: Arc<StartScanUseCase>,
    pub queries: Arc<ScanQueryService>,
    pub job_store: Arc<dyn JobStore>,
    pub tools: Arc<ToolRegistry>,
}
