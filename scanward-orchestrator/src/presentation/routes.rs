//! Route definitions and server setup

use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::{Json, Router, routing::get};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use scanward_core::config::ServerConfig;

use crate::presentation::controllers::{ScanApiState, health::health_check, scans};
use crate::presentation::models::*;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::controllers::scans::start_scan,
        crate::presentation::controllers::scans::get_scans,
        crate::presentation::controllers::scans::get_scan,
        crate::presentation::controllers::health::health_check
    ),
    components(
        schemas(
            StartScanRequest,
            ScanAcceptedResponse,
            ScanJobResponse,
            ScanResultsResponse,
            ScanListResponse,
            ErrorResponse,
            HealthResponse,
            ComponentHealth,
            ToolHealth,
            crate::domain::ScanStatus,
            crate::domain::StatusTransition,
            crate::domain::ScanResults,
            crate::domain::ResultsSummary,
            crate::domain::SeverityBreakdown,
            scanward_tools::ToolKind,
            scanward_tools::TrivyVulnerability,
            scanward_tools::GitleaksSecret,
            scanward_tools::SemgrepFinding
        )
    ),
    tags(
        (name = "scans", description = "Trigger security scans and poll their status"),
        (name = "health", description = "Service health and scanner availability")
    ),
    info(
        title = "Scanward API",
        version = "0.3.0",
        description = "Background security scans of Git repositories with trivy, gitleaks and semgrep.",
        license(
            name = "AGPL-3.0",
            url = "https://www.gnu.org/licenses/agpl-3.0.html"
        )
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let allow_origin = if config.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| {
                        tracing::warn!(origin, "Invalid CORS origin in config; skipping");
                    })
                    .ok()
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Create the application router with its middleware stack
pub fn create_router(state: ScanApiState, config: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .route("/scans", get(scans::get_scans).post(scans::start_scan))
        .route("/scans/{id}", get(scans::get_scan));

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check));

    // Keep the schema out of production unless explicitly enabled
    if config.enable_docs {
        router = router.route("/api-docs/openapi.json", get(openapi_json));
    }

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_seconds),
        ));

    router.layer(service_builder).with_state(state)
}
