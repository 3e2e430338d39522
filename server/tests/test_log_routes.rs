//! Log route tests
//!
//! Drives the real router against in-memory fakes for the deployment API
//! and session verifier.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use adventus_server::authn::session::{SessionClaims, SessionVerifierExt};
use adventus_server::errors::AppError;
use adventus_server::models::deployment::Deployment;
use adventus_server::server::serve::router;
use adventus_server::server::state::ServerState;
use adventus_server::vercel::client::RuntimeLogsOutcome;
use adventus_server::vercel::deployments::DeploymentApi;

const VALID_SESSION: &str = "valid-session";

struct FakeVerifier;

impl SessionVerifierExt for FakeVerifier {
    fn verify(&self, raw: &str) -> Result<SessionClaims, AppError> {
        if raw == VALID_SESSION {
            Ok(SessionClaims {
                sub: "user_123".to_string(),
                iat: 0,
                exp: i64::MAX,
                iss: None,
            })
        } else {
            Err(AppError::AuthError("invalid session".to_string()))
        }
    }
}

struct FakeApi {
    deployment: Option<Deployment>,
    events: Vec<Value>,
    runtime: RuntimeLogsOutcome,
    fail_listing: bool,
    calls: AtomicUsize,
    last_target: Mutex<Option<String>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            deployment: None,
            events: vec![],
            runtime: RuntimeLogsOutcome::Success {
                body: String::new(),
            },
            fail_listing: false,
            calls: AtomicUsize::new(0),
            last_target: Mutex::new(None),
        }
    }
}

#[async_trait]
impl DeploymentApi for FakeApi {
    async fn latest_deployment(
        &self,
        target: Option<&str>,
    ) -> Result<Option<Deployment>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_target.lock().unwrap() = target.map(str::to_string);
        if self.fail_listing {
            return Err(AppError::UpstreamError(
                "Failed to fetch deployments: 502 Bad Gateway".to_string(),
            ));
        }
        Ok(self.deployment.clone())
    }

    async fn deployment_events(&self, _deployment_id: &str) -> Result<Vec<Value>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.events.clone())
    }

    async fn runtime_logs(&self, _deployment_id: &str) -> Result<RuntimeLogsOutcome, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.runtime.clone())
    }
}

fn test_deployment() -> Deployment {
    Deployment {
        uid: "dpl_123".to_string(),
        url: "my-app.vercel.app".to_string(),
        state: "READY".to_string(),
        created: 1700000000000,
    }
}

fn make_router(api: Option<Arc<FakeApi>>) -> Router {
    let api = api.map(|api| api as Arc<dyn DeploymentApi>);
    router(Arc::new(ServerState::new(api, Arc::new(FakeVerifier))))
}

async fn get(app: Router, path: &str, session: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(path);
    if let Some(session) = session {
        request = request.header("authorization", format!("Bearer {}", session));
    }

    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap();

    (status, body)
}

#[tokio::test]
async fn test_unauthorized_without_session() {
    for path in ["/api/logs/build", "/api/logs/runtime"] {
        let api = Arc::new(FakeApi::default());
        let (status, body) = get(make_router(Some(api.clone())), path, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
        // Upstream must never be consulted for unauthenticated requests
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_unauthorized_with_invalid_session() {
    let api = Arc::new(FakeApi::default());
    let (status, body) = get(
        make_router(Some(api.clone())),
        "/api/logs/build",
        Some("forged-token"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
    assert_eq!(api.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_credentials() {
    for path in ["/api/logs/build", "/api/logs/runtime"] {
        let (status, body) = get(make_router(None), path, Some(VALID_SESSION)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Vercel credentials not configured");
    }
}

#[tokio::test]
async fn test_build_no_deployments() {
    let api = Arc::new(FakeApi::default());
    let (status, body) = get(
        make_router(Some(api)),
        "/api/logs/build",
        Some(VALID_SESSION),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logs"], "No deployments found");
    assert!(body.get("deployment").is_none());
}

#[tokio::test]
async fn test_runtime_no_production_deployments() {
    let api = Arc::new(FakeApi::default());
    let (status, body) = get(
        make_router(Some(api.clone())),
        "/api/logs/runtime",
        Some(VALID_SESSION),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logs"], "No production deployments found");
    assert!(body.get("deployment").is_none());
    // Runtime lookups are restricted to the production target
    assert_eq!(
        api.last_target.lock().unwrap().as_deref(),
        Some("production")
    );
}

#[tokio::test]
async fn test_build_formats_one_line_per_event() {
    let api = Arc::new(FakeApi {
        deployment: Some(test_deployment()),
        events: vec![
            json!({"created": 1700000000000i64, "text": "Cloning repository"}),
            json!({"created": 1700000001000i64, "payload": {"text": "Installing dependencies"}}),
            json!({"created": 1700000002000i64, "type": "deployment-state"}),
        ],
        ..FakeApi::default()
    });
    let (status, body) = get(
        make_router(Some(api)),
        "/api/logs/build",
        Some(VALID_SESSION),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let logs = body["logs"].as_str().unwrap();
    let lines: Vec<&str> = logs.lines().collect();
    assert_eq!(lines.len(), 3);
    for line in &lines {
        assert!(line.starts_with("[2023-11-14T22:13:2"), "bad line: {}", line);
    }
    assert_eq!(lines[0], "[2023-11-14T22:13:20.000Z] Cloning repository");

    assert_eq!(body["deployment"]["id"], "dpl_123");
    assert_eq!(body["deployment"]["url"], "my-app.vercel.app");
    assert_eq!(body["deployment"]["state"], "READY");
    assert_eq!(body["deployment"]["createdAt"], 1700000000000i64);
}

#[tokio::test]
async fn test_build_empty_events_placeholder() {
    let api = Arc::new(FakeApi {
        deployment: Some(test_deployment()),
        ..FakeApi::default()
    });
    let (status, body) = get(
        make_router(Some(api)),
        "/api/logs/build",
        Some(VALID_SESSION),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logs"], "No build logs available");
    assert_eq!(body["deployment"]["id"], "dpl_123");
}

#[tokio::test]
async fn test_build_upstream_failure() {
    let api = Arc::new(FakeApi {
        fail_listing: true,
        ..FakeApi::default()
    });
    let (status, body) = get(
        make_router(Some(api)),
        "/api/logs/build",
        Some(VALID_SESSION),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Failed to fetch deployments"));
}

#[tokio::test]
async fn test_runtime_forbidden_degrades_to_deep_link() {
    let api = Arc::new(FakeApi {
        deployment: Some(test_deployment()),
        runtime: RuntimeLogsOutcome::Forbidden,
        ..FakeApi::default()
    });
    let (status, body) = get(
        make_router(Some(api)),
        "/api/logs/runtime",
        Some(VALID_SESSION),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vercelLogsUrl"], "https://my-app.vercel.app/_logs");
    assert!(body["logs"].as_str().unwrap().contains("free plan"));
    assert_eq!(body["deployment"]["id"], "dpl_123");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_runtime_soft_failure_keeps_status_200() {
    let api = Arc::new(FakeApi {
        deployment: Some(test_deployment()),
        runtime: RuntimeLogsOutcome::Failed {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "upstream exploded".to_string(),
        },
        ..FakeApi::default()
    });
    let (status, body) = get(
        make_router(Some(api)),
        "/api/logs/runtime",
        Some(VALID_SESSION),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let logs = body["logs"].as_str().unwrap();
    assert!(logs.contains("Runtime logs API error (500): upstream exploded"));
    assert!(logs.contains("only stored for 1 hour"));
    assert_eq!(body["deployment"]["id"], "dpl_123");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_runtime_mixed_ndjson() {
    let api = Arc::new(FakeApi {
        deployment: Some(test_deployment()),
        runtime: RuntimeLogsOutcome::Success {
            body: "{\"timestampInMs\":1700000000000,\"level\":\"error\",\"message\":\"boom\"}\nnot-json\n"
                .to_string(),
        },
        ..FakeApi::default()
    });
    let (status, body) = get(
        make_router(Some(api)),
        "/api/logs/runtime",
        Some(VALID_SESSION),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["logs"],
        "[2023-11-14T22:13:20.000Z] [ERROR] boom\nnot-json"
    );
}

#[tokio::test]
async fn test_runtime_empty_stream_placeholder() {
    let api = Arc::new(FakeApi {
        deployment: Some(test_deployment()),
        ..FakeApi::default()
    });
    let (status, body) = get(
        make_router(Some(api)),
        "/api/logs/runtime",
        Some(VALID_SESSION),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["logs"],
        "No runtime logs available (logs are only kept for 1 hour)"
    );
    assert_eq!(body["deployment"]["id"], "dpl_123");
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(make_router(None), "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "adventus-server");
}
