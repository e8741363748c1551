//! HTTP API tests

mod common;

use axum::body::Bytes;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::Arc;

use common::{
    FakeBehavior, FakeTool, FakeWorkspaceProvider, RecordingJobStore, TOKEN, UnavailableJobStore,
    execute_use_case, healthy_tools, query_service, start_scan_use_case,
};
use scanward_core::config::ServerConfig;
use scanward_orchestrator::domain::{Credential, ScanId};
use scanward_orchestrator::infrastructure::job_queue::ScanQueueReceiver;
use scanward_orchestrator::infrastructure::{JobStore, ToolRegistry};
use scanward_orchestrator::presentation::{ScanApiState, create_router};
use scanward_tools::{ToolError, ToolKind};

struct Harness {
    server: TestServer,
    store: Arc<dyn JobStore>,
    receiver: ScanQueueReceiver,
}

fn harness_with(store: Arc<dyn JobStore>, tools: ToolRegistry, config: &ServerConfig) -> Harness {
    let (start_scan, _queue, receiver) = start_scan_use_case(store.clone());
    let state = ScanApiState {
        start_scan_use_case: Arc::new(start_scan),
        queries: Arc::new(query_service(store.clone())),
        job_store: store.clone(),
        tools: Arc::new(tools),
    };
    let server = TestServer::new(create_router(state, config)).unwrap();
    Harness {
        server,
        store,
        receiver,
    }
}

fn harness() -> Harness {
    harness_with(
        Arc::new(RecordingJobStore::new()),
        healthy_tools(),
        &ServerConfig::default(),
    )
}

/// Run the next queued scan to completion with healthy fake tools.
async fn run_next_scan(harness: &mut Harness) {
    let queued = harness.receiver.recv().await.unwrap();
    execute_use_case(
        harness.store.clone(),
        Arc::new(FakeWorkspaceProvider::ok()),
        healthy_tools(),
    )
    .execute(queued.job, &queued.credential)
    .await
    .unwrap();
}

async fn trigger(server: &TestServer, body: Value) -> axum_test::TestResponse {
    server.post("/api/v1/scans").json(&body).await
}

#[tokio::test]
async fn test_trigger_scan_returns_accepted() {
    let mut harness = harness();

    let response = trigger(&harness.server, json!({ "repoName": "acme/web-app" })).await;

    response.assert_status(StatusCode::ACCEPTED);
    let body: Value = response.json();
    assert_eq!(body["status"], "pending");
    let scan_id = body["scanId"].as_str().unwrap();
    assert_eq!(scan_id.len(), 12);

    let queued = harness.receiver.recv().await.unwrap();
    assert_eq!(queued.job.id.as_str(), scan_id);
    assert_eq!(queued.credential, Credential::new(TOKEN));
}

#[tokio::test]
async fn test_trigger_with_tool_subset() {
    let harness = harness();

    let response = trigger(
        &harness.server,
        json!({ "repoName": "api", "tools": ["semgrep", "TRIVY", "bogus"] }),
    )
    .await;
    response.assert_status(StatusCode::ACCEPTED);
    let scan_id = response.json::<Value>()["scanId"].as_str().unwrap().to_string();

    let job: Value = harness
        .server
        .get(&format!("/api/v1/scans/{scan_id}"))
        .await
        .json();
    assert_eq!(job["tools"], json!(["trivy", "semgrep"]));
    assert_eq!(job["repoName"], "api");
    assert_eq!(job["repoFullName"], "acme/api");
}

#[tokio::test]
async fn test_trigger_rejects_bad_requests() {
    let harness = harness();

    for body in [
        json!({ "repoName": "" }),
        json!({ "repoName": "a/b/c" }),
        json!({ "repoName": "acme/api", "tools": ["nmap"] }),
        json!({ "repoName": "acme/api", "tools": [] }),
    ] {
        let response = trigger(&harness.server, body.clone()).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(
            response.json::<Value>()["error"].is_string(),
            "no error message for {body}"
        );
    }

    let list: Value = harness.server.get("/api/v1/scans").await.json();
    assert_eq!(list["scans"], json!([]));
}

#[tokio::test]
async fn test_trigger_rejects_undecodable_bodies_as_bad_request() {
    let harness = harness();

    for body in [
        json!({ "tools": ["trivy"] }),
        json!({ "repoName": 42 }),
        json!({ "repoName": "acme/api", "tools": "trivy" }),
    ] {
        let response = trigger(&harness.server, body.clone()).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(
            response.json::<Value>()["error"].is_string(),
            "no error message for {body}"
        );
    }

    let response = harness
        .server
        .post("/api/v1/scans")
        .bytes(Bytes::from_static(b"{\"repoName\": "))
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());

    let list: Value = harness.server.get("/api/v1/scans").await.json();
    assert_eq!(list["scans"], json!([]));
}

#[tokio::test]
async fn test_duplicate_trigger_conflicts_with_running_scan() {
    let harness = harness();

    let first: Value = trigger(&harness.server, json!({ "repoName": "acme/api" }))
        .await
        .json();
    let response = trigger(&harness.server, json!({ "repoName": "acme/api" })).await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["scanId"], first["scanId"]);
    assert!(body["error"].as_str().unwrap().contains("already running"));
}

#[tokio::test]
async fn test_store_outage_returns_service_unavailable() {
    let harness = harness_with(
        Arc::new(UnavailableJobStore),
        healthy_tools(),
        &ServerConfig::default(),
    );

    trigger(&harness.server, json!({ "repoName": "acme/api" }))
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
    harness
        .server
        .get("/api/v1/scans")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_closed_queue_returns_service_unavailable() {
    let Harness {
        server, receiver, ..
    } = harness();
    drop(receiver);

    let response = trigger(&server, json!({ "repoName": "acme/api" })).await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.json::<Value>()["error"].is_string());

    let list: Value = server.get("/api/v1/scans").await.json();
    assert_eq!(list["scans"], json!([]));
}

#[tokio::test]
async fn test_get_completed_scan_by_id() {
    let mut harness = harness();
    let accepted: Value = trigger(&harness.server, json!({ "repoName": "acme/web-app" }))
        .await
        .json();
    let scan_id = accepted["scanId"].as_str().unwrap().to_string();
    run_next_scan(&mut harness).await;

    for response in [
        harness
            .server
            .get("/api/v1/scans")
            .add_query_param("id", &scan_id)
            .await,
        harness.server.get(&format!("/api/v1/scans/{scan_id}")).await,
    ] {
        response.assert_status_ok();
        let job: Value = response.json();
        assert_eq!(job["id"], scan_id.as_str());
        assert_eq!(job["status"], "completed");
        assert_eq!(job["commitSha"], "0123456789abcdef");
        assert!(job["completedAt"].is_string());
        assert_eq!(job["results"]["trivy"][0]["id"], "CVE-2021-23337");
        assert_eq!(job["results"]["gitleaks"][0]["match"], "TOKEN=REDACTED");
        assert_eq!(job["results"]["semgrep"][0]["startLine"], 3);
        assert_eq!(job["results"]["summary"]["totalFindings"], 3);
        assert_eq!(job["results"]["summary"]["bySeverity"]["high"], 2);
        assert_eq!(job["results"]["summary"]["bySeverity"]["medium"], 1);
        assert_eq!(job["transitions"].as_array().unwrap().len(), 3);
        assert!(job.get("error").is_none());
    }
}

#[tokio::test]
async fn test_tool_errors_are_exposed() {
    let store: Arc<dyn JobStore> = Arc::new(RecordingJobStore::new());
    let mut harness = harness_with(store.clone(), healthy_tools(), &ServerConfig::default());
    let accepted: Value = trigger(&harness.server, json!({ "repoName": "acme/api" }))
        .await
        .json();
    let scan_id = accepted["scanId"].as_str().unwrap().to_string();

    let queued = harness.receiver.recv().await.unwrap();
    let tools = ToolRegistry::new([
        FakeTool::new(
            ToolKind::Trivy,
            FakeBehavior::Error(ToolError::NotInstalled {
                executable: "trivy".into(),
            }),
        ),
        FakeTool::new(ToolKind::Gitleaks, FakeBehavior::Error(ToolError::Timeout(180))),
        FakeTool::new(
            ToolKind::Semgrep,
            FakeBehavior::Error(ToolError::OutputParse("expected value".into())),
        ),
    ]);
    execute_use_case(store, Arc::new(FakeWorkspaceProvider::ok()), tools)
        .execute(queued.job, &queued.credential)
        .await
        .unwrap();

    let job: Value = harness
        .server
        .get(&format!("/api/v1/scans/{scan_id}"))
        .await
        .json();
    assert_eq!(job["status"], "completed");
    assert_eq!(job["results"]["toolErrors"]["trivy"], "trivy not found in PATH");
    assert_eq!(
        job["results"]["toolErrors"]["gitleaks"],
        "Timed out after 180 seconds"
    );
    assert!(job["results"].get("trivy").is_none());
    assert_eq!(job["results"]["summary"]["toolsFailed"], 3);
    assert_eq!(job["results"]["summary"]["totalFindings"], 0);
}

#[tokio::test]
async fn test_get_latest_scan_by_repo() {
    let mut harness = harness();
    trigger(&harness.server, json!({ "repoName": "web-app" }))
        .await
        .assert_status(StatusCode::ACCEPTED);
    run_next_scan(&mut harness).await;
    let second: Value = trigger(&harness.server, json!({ "repoName": "web-app" }))
        .await
        .json();

    let response = harness
        .server
        .get("/api/v1/scans")
        .add_query_param("repo", "web-app")
        .await;

    response.assert_status_ok();
    let job: Value = response.json();
    assert_eq!(job["id"], second["scanId"]);
    assert_eq!(job["status"], "pending");
}

#[tokio::test]
async fn test_bare_and_qualified_names_refer_to_one_repository() {
    let harness = harness();
    let accepted: Value = trigger(&harness.server, json!({ "repoName": "api" }))
        .await
        .json();

    let conflict = trigger(&harness.server, json!({ "repoName": "acme/api" })).await;
    conflict.assert_status(StatusCode::CONFLICT);
    assert_eq!(conflict.json::<Value>()["scanId"], accepted["scanId"]);

    for repo in ["api", "acme/api"] {
        let response = harness
            .server
            .get("/api/v1/scans")
            .add_query_param("repo", repo)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["id"], accepted["scanId"], "lookup by {repo}");
    }
}

#[tokio::test]
async fn test_unknown_scans_are_not_found() {
    let harness = harness();

    harness
        .server
        .get("/api/v1/scans/000000000000")
        .await
        .assert_status_not_found();
    harness
        .server
        .get("/api/v1/scans")
        .add_query_param("id", "000000000000")
        .await
        .assert_status_not_found();
    let response = harness
        .server
        .get("/api/v1/scans")
        .add_query_param("repo", "never-scanned")
        .await;
    response.assert_status_not_found();
    assert!(response.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn test_list_recent_scans_newest_first_with_limit() {
    let harness = harness();
    let mut ids = Vec::new();
    for repo in ["acme/one", "acme/two", "acme/three"] {
        let accepted: Value = trigger(&harness.server, json!({ "repoName": repo }))
            .await
            .json();
        ids.push(accepted["scanId"].as_str().unwrap().to_string());
    }

    let list: Value = harness.server.get("/api/v1/scans").await.json();
    let listed: Vec<&str> = list["scans"]
        .as_array()
        .unwrap()
        .iter()
        .map(|scan| scan["id"].as_str().unwrap())
        .collect();
    assert_eq!(listed, vec![ids[2].as_str(), ids[1].as_str(), ids[0].as_str()]);

    let limited: Value = harness
        .server
        .get("/api/v1/scans")
        .add_query_param("limit", 2)
        .await
        .json();
    assert_eq!(limited["scans"].as_array().unwrap().len(), 2);
    assert_eq!(limited["scans"][0]["id"], ids[2].as_str());
}

#[tokio::test]
async fn test_health_reports_store_and_tools() {
    let tools = ToolRegistry::new([
        FakeTool::new(ToolKind::Trivy, FakeBehavior::Slow(std::time::Duration::ZERO)),
        FakeTool::new(
            ToolKind::Semgrep,
            FakeBehavior::Error(ToolError::NotInstalled {
                executable: "semgrep".into(),
            }),
        ),
    ]);
    let harness = harness_with(
        Arc::new(RecordingJobStore::new()),
        tools,
        &ServerConfig::default(),
    );

    let response = harness.server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"]["status"], "ok");
    assert_eq!(body["tools"][0]["tool"], "trivy");
    assert_eq!(body["tools"][0]["installed"], true);
    assert_eq!(body["tools"][0]["version"], "trivy 1.0.0");
    assert_eq!(body["tools"][1]["tool"], "semgrep");
    assert_eq!(body["tools"][1]["installed"], false);
    assert_eq!(body["tools"][1]["error"], "semgrep not found in PATH");
}

#[tokio::test]
async fn test_health_degraded_when_store_down() {
    let harness = harness_with(
        Arc::new(UnavailableJobStore),
        healthy_tools(),
        &ServerConfig::default(),
    );

    let body: Value = harness.server.get("/health").await.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["store"]["status"], "unavailable");
    assert!(body["store"]["error"].is_string());
}

#[tokio::test]
async fn test_openapi_document_is_gated_by_config() {
    let config = ServerConfig {
        enable_docs: true,
        ..ServerConfig::default()
    };
    let harness = harness_with(Arc::new(RecordingJobStore::new()), healthy_tools(), &config);
    let doc: Value = harness.server.get("/api-docs/openapi.json").await.json();
    assert_eq!(doc["info"]["title"], "Scanward API");
    assert!(doc["paths"].get("/api/v1/scans").is_some());
    assert!(doc["paths"].get("/api/v1/scans/{id}").is_some());

    let config = ServerConfig {
        enable_docs: false,
        ..ServerConfig::default()
    };
    let harness = harness_with(Arc::new(RecordingJobStore::new()), healthy_tools(), &config);
    harness
        .server
        .get("/api-docs/openapi.json")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_scan_id_round_trips_through_path() {
    let harness = harness();
    let accepted: Value = trigger(&harness.server, json!({ "repoName": "acme/api" }))
        .await
        .json();
    let id = ScanId::from(accepted["scanId"].as_str().unwrap());

    let stored = harness.store.get(&id).await.unwrap().unwrap();
    let fetched: Value = harness
        .server
        .get(&format!("/api/v1/scans/{id}"))
        .await
        .json();
    assert_eq!(fetched["repoFullName"], stored.repo_full_name);
}
