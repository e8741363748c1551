use axum::{
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::debug;

use crate::domain::ScanId;
use crate::presentation::controllers::ScanApiState;
use crate::presentation::errors::ApiError;
use crate::presentation::models::{
    ErrorResponse, ScanAcceptedResponse, ScanJobResponse, ScanListResponse, ScanQuery,
    StartScanRequest,
};

/// POST /api/v1/scans - Trigger a background scan
#[utoipa::path(
    post,
    path = "/api/v1/scans",
    request_body = StartScanRequest,
    responses(
        (status = 202, description = "Scan accepted and queued", body = ScanAcceptedResponse),
        (status = 400, description = "Malformed body, invalid repository name, no valid tools or missing credential", body = ErrorResponse),
        (status = 409, description = "A scan is already running for this repository", body = ErrorResponse),
        (status = 503, description = "Job store or scan queue unavailable", body = ErrorResponse)
    ),
    tag = "scans"
)]
pub async fn start_scan(
    State(state): State<ScanApiState>,
    payload: Result<Json<StartScanRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ScanAcceptedResponse>), ApiError> {
    let Json(request) = payload?;
    let job = state
        .start_scan_use_case
        .execute(&request.repo_name, request.tools.as_deref())
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ScanAcceptedResponse {
            scan_id: job.id,
            status: job.status,
        }),
    ))
}

/// GET /api/v1/scans - Get a scan by id, the latest scan of a repository, or recent scans
#[utoipa::path(
    get,
    path = "/api/v1/scans",
    params(ScanQuery),
    responses(
        (status = 200, description = "Scan (with `id` or `repo`) or list of recent scans", body = ScanListResponse),
        (status = 404, description = "Scan not found", body = ErrorResponse),
        (status = 503, description = "Job store unavailable", body = ErrorResponse)
    ),
    tag = "scans"
)]
pub async fn get_scans(
    State(state): State<ScanApiState>,
    Query(query): Query<ScanQuery>,
) -> Result<Response, ApiError> {
    if let Some(id) = query.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        let job = find_scan(&state, ScanId::from(id)).await?;
        return Ok(Json(job).into_response());
    }

    if let Some(repo) = query.repo.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        let job = state
            .queries
            .latest_for_repo(repo)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("No scans found for {repo}")))?;
        return Ok(Json(ScanJobResponse::from(job)).into_response());
    }

    let scans = state.queries.list_recent(query.limit).await?;
    debug!(count = scans.len(), "Listing recent scans");
    Ok(Json(ScanListResponse {
        scans: scans.into_iter().map(ScanJobResponse::from).collect(),
    })
    .into_response())
}

/// GET /api/v1/scans/{id} - Retrieve a scan by id
#[utoipa::path(
    get,
    path = "/api/v1/scans/{id}",
    params(
        ("id" = String, Path, description = "Scan ID")
    ),
    responses(
        (status = 200, description = "Scan found", body = ScanJobResponse),
        (status = 404, description = "Scan not found", body = ErrorResponse),
        (status = 503, description = "Job store unavailable", body = ErrorResponse)
    ),
    tag = "scans"
)]
pub async fn get_scan(
    State(state): State<ScanApiState>,
    Path(id): Path<String>,
) -> Result<Json<ScanJobResponse>, ApiError> {
    find_scan(&state, ScanId::from(id)).await.map(Json)
}

async fn find_scan(state: &ScanApiState, id: ScanId) -> Result<ScanJobResponse, ApiError> {
    state
        .queries
        .get(&id)
        .await?
        .map(ScanJobResponse::from)
        .ok_or_else(|| ApiError::NotFound(format!("Scan not found: {id}")))
}
