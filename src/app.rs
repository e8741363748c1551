//! Application setup and wiring

use std::sync::Arc;

use axum::Router;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use scanward_core::Config;
use scanward_core::config::StoreBackend;
use scanward_core::infrastructure::cache::DragonflyCache;
use scanward_orchestrator::application::{
    AdmissionPolicy, ExecuteScanUseCase, ScanQueryService, ScanWorkflow, StartScanUseCase,
};
use scanward_orchestrator::domain::{CredentialProvider, WorkspaceProvider};
use scanward_orchestrator::infrastructure::{
    DragonflyJobStore, EnvCredentialProvider, GitWorkspaceConfig, GitWorkspaceProvider,
    InMemoryJobStore, JobStore, ScanWorkerContext, ToolRegistry, scan_queue,
    spawn_scan_worker_pool,
};
use scanward_orchestrator::presentation::{ScanApiState, create_router};
use scanward_tools::configured_tools;

/// Handle returned from create_app for graceful shutdown coordination
pub struct AppHandle {
    pub router: Router,
    pub shutdown_token: CancellationToken,
    /// Completes after `shutdown_token` is cancelled and running scans have finished
    pub worker_pool: JoinHandle<()>,
}

async fn create_job_store(config: &Config) -> Result<Arc<dyn JobStore>, Box<dyn std::error::Error>> {
    let store = &config.store;
    match store.backend {
        StoreBackend::Dragonfly => {
            tracing::info!("Initializing Dragonfly job store at {}", store.dragonfly_url);
            let cache = DragonflyCache::connect(
                &store.dragonfly_url,
                std::time::Duration::from_secs(store.connection_timeout_seconds),
            )
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to Dragonfly DB: {}", e);
                e
            })?;
            Ok(Arc::new(DragonflyJobStore::new(
                Arc::new(cache),
                store.key_prefix.clone(),
                store.ttl(),
                store.recent_capacity,
            )))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory job store; scans are lost on restart");
            Ok(Arc::new(InMemoryJobStore::new(
                store.ttl(),
                store.recent_capacity,
            )))
        }
    }
}

/// Create the application router and start the background scan workers
pub async fn create_app(config: Config) -> Result<AppHandle, Box<dyn std::error::Error>> {
    let shutdown_token = CancellationToken::new();

    let job_store = create_job_store(&config).await?;

    // Scanner runners; disabled tools are reported as unregistered per scan
    let tools = Arc::new(ToolRegistry::new(configured_tools(&config.tools)));
    for availability in tools.availability().await {
        match availability.version {
            Ok(version) => tracing::info!(tool = %availability.kind, version = %version, "Scanner available"),
            Err(e) => tracing::warn!(tool = %availability.kind, error = %e, "Scanner unavailable"),
        }
    }

    let workspaces: Arc<dyn WorkspaceProvider> = Arc::new(GitWorkspaceProvider::new(
        GitWorkspaceConfig::from(&config.git),
    )?);
    let credentials: Arc<dyn CredentialProvider> =
        Arc::new(EnvCredentialProvider::new(config.credentials.env_var.clone()));

    let execute_scan_use_case = Arc::new(ExecuteScanUseCase::new(
        ScanWorkflow::new(job_store.clone()),
        workspaces,
        tools.clone(),
    ));

    // Initialize background scan queue and worker pool
    let (queue, receiver) = scan_queue(config.scan.queue_capacity);
    let worker_pool = spawn_scan_worker_pool(
        ScanWorkerContext {
            execute_scan_use_case,
        },
        receiver,
        config.scan.max_concurrent_scans,
        shutdown_token.clone(),
    );

    let start_scan_use_case = Arc::new(StartScanUseCase::new(
        job_store.clone(),
        queue,
        credentials,
        AdmissionPolicy {
            default_owner: config.git.default_owner.clone(),
            window: config.scan.admission_window,
        },
    ));
    let queries = Arc::new(ScanQueryService::new(
        job_store.clone(),
        config.scan.list_limit,
        config.git.default_owner.clone(),
    ));

    let state = ScanApiState {
        start_scan_use_case,
        queries,
        job_store,
        tools,
    };

    let router = create_router(state, &config.server);

    Ok(AppHandle {
        router,
        shutdown_token,
        worker_pool,
    })
}
