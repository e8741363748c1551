use axum::{extract::State, response::Json};
use chrono::Utc;

use crate::presentation::controllers::ScanApiState;
use crate::presentation::models::{ComponentHealth, HealthResponse, ToolHealth};

/// GET /health - Service health, job store reachability and installed tools
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health report", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<ScanApiState>) -> Json<HealthResponse> {
    let (store, availability) =
        tokio::join!(state.job_store.health_check(), state.tools.availability());

    let store = match store {
        Ok(()) => ComponentHealth {
            status: "ok".to_string(),
            error: None,
        },
        Err(e) => ComponentHealth {
            status: "unavailable".to_string(),
            error: Some(e.to_string()),
        },
    };

    let tools = availability
        .into_iter()
        .map(|probe| match probe.version {
            Ok(version) => ToolHealth {
                tool: probe.kind,
                installed: true,
                version: Some(version).filter(|v| !v.is_empty()),
                error: None,
            },
            Err(e) => ToolHealth {
                tool: probe.kind,
                installed: false,
                version: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    Json(HealthResponse {
        status: if store.error.is_none() {
            "healthy"
        } else {
            "degraded"
        }
        .to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        store,
        tools,
    })
}
