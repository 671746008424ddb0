//! Integration tests for the gateway.
//!
//! These tests run a real HTTP server (axum) on a loopback port and
//! drive the gateway against it, so credential injection, status
//! classification, and the unauthorized reaction are all verified over
//! actual requests rather than mocked plumbing.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use parkline_api::ApiError;
use parkline_gateway::{Gateway, GatewayConfig, SessionObserver};
use parkline_session::CredentialCell;
use serde_json::{Value, json};

// -- Helpers ----------------------------------------------------------------

/// Serves the router on a random loopback port, returns its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = listener.local_addr().expect("should have local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server should run");
    });
    format!("http://{addr}")
}

fn gateway_for(base_url: String, credential: CredentialCell) -> Gateway {
    Gateway::new(
        GatewayConfig {
            base_url,
            login_path: "/login".to_string(),
            timeout: Duration::from_secs(5),
        },
        credential,
    )
}

/// Records how often each observer hook fired.
#[derive(Default)]
struct RecordingObserver {
    invalidated: AtomicUsize,
    login_required: AtomicUsize,
}

impl SessionObserver for RecordingObserver {
    fn session_invalidated(&self) {
        self.invalidated.fetch_add(1, Ordering::SeqCst);
    }

    fn login_required(&self) {
        self.login_required.fetch_add(1, Ordering::SeqCst);
    }
}

/// Echoes the Authorization header back as JSON.
async fn echo_auth(headers: HeaderMap) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    Json(json!({ "auth": auth }))
}

// =============================================================================
// Credential injection
// =============================================================================

#[tokio::test]
async fn test_get_armed_credential_sends_bearer_header() {
    let base = serve(Router::new().route("/whoami", get(echo_auth))).await;
    let credential = CredentialCell::new();
    credential.set("tok-abc".into());
    let gateway = gateway_for(base, credential);

    let body: Value = gateway.get("/whoami").await.expect("should succeed");

    assert_eq!(body["auth"], "Bearer tok-abc");
}

#[tokio::test]
async fn test_get_disarmed_credential_sends_no_auth_header() {
    let base = serve(Router::new().route("/whoami", get(echo_auth))).await;
    let gateway = gateway_for(base, CredentialCell::new());

    let body: Value = gateway.get("/whoami").await.expect("should succeed");

    assert_eq!(body["auth"], "");
}

#[tokio::test]
async fn test_get_picks_up_credential_armed_after_construction() {
    // The cell is shared state: arming it later must affect requests
    // already-constructed gateways make.
    let base = serve(Router::new().route("/whoami", get(echo_auth))).await;
    let credential = CredentialCell::new();
    let gateway = gateway_for(base, credential.clone());

    let before: Value = gateway.get("/whoami").await.expect("should succeed");
    credential.set("tok-later".into());
    let after: Value = gateway.get("/whoami").await.expect("should succeed");

    assert_eq!(before["auth"], "");
    assert_eq!(after["auth"], "Bearer tok-later");
}

// =============================================================================
// Classification
// =============================================================================

#[tokio::test]
async fn test_execute_rejection_carries_server_wording() {
    let base = serve(Router::new().route(
        "/reserve",
        get(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "You already have an active reservation" })),
            )
        }),
    ))
    .await;
    let gateway = gateway_for(base, CredentialCell::new());

    let result: Result<Value, ApiError> = gateway.get("/reserve").await;

    assert_eq!(
        result.unwrap_err(),
        ApiError::Validation {
            message: "You already have an active reservation".into()
        }
    );
}

#[tokio::test]
async fn test_execute_server_failure_maps_to_server_error() {
    let base = serve(Router::new().route(
        "/broken",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    ))
    .await;
    let gateway = gateway_for(base, CredentialCell::new());

    let result: Result<Value, ApiError> = gateway.get("/broken").await;

    // Non-JSON error body means no server wording, just the class.
    assert_eq!(result.unwrap_err(), ApiError::Server { message: None });
}

#[tokio::test]
async fn test_execute_alien_success_body_is_a_decode_error() {
    #[derive(serde::Deserialize, Debug)]
    struct Expected {
        #[allow(dead_code)]
        user: String,
    }

    let base = serve(Router::new().route(
        "/odd",
        get(|| async { Json(json!({ "something": "else" })) }),
    ))
    .await;
    let gateway = gateway_for(base, CredentialCell::new());

    let result: Result<Expected, ApiError> = gateway.get("/odd").await;

    assert!(matches!(result, Err(ApiError::Decode { .. })));
}

#[tokio::test]
async fn test_execute_unreachable_server_is_a_network_error() {
    // Nothing listens here; the connect itself fails.
    let gateway = gateway_for(
        "http://127.0.0.1:9".to_string(),
        CredentialCell::new(),
    );

    let result: Result<Value, ApiError> = gateway.get("/anything").await;

    assert!(matches!(result, Err(ApiError::Network { .. })));
}

// =============================================================================
// The unauthorized reaction
// =============================================================================

fn reject_all() -> Router {
    Router::new().route(
        "/private",
        get(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Token expired" })),
            )
        }),
    )
}

#[tokio::test]
async fn test_unauthorized_fires_observer_exactly_once_per_request() {
    let base = serve(reject_all()).await;
    let gateway = gateway_for(base, CredentialCell::new());
    let observer = Arc::new(RecordingObserver::default());
    gateway.set_observer(observer.clone());
    gateway.set_location("/dashboard");

    let result: Result<Value, ApiError> = gateway.get("/private").await;

    assert!(result.unwrap_err().is_unauthorized());
    assert_eq!(observer.invalidated.load(Ordering::SeqCst), 1);
    assert_eq!(observer.login_required.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unauthorized_on_login_surface_skips_redirect() {
    let base = serve(reject_all()).await;
    let gateway = gateway_for(base, CredentialCell::new());
    let observer = Arc::new(RecordingObserver::default());
    gateway.set_observer(observer.clone());
    gateway.set_location("/login");

    let result: Result<Value, ApiError> = gateway.get("/private").await;

    // The session still dies, but the user stays where they are.
    assert!(result.unwrap_err().is_unauthorized());
    assert_eq!(observer.invalidated.load(Ordering::SeqCst), 1);
    assert_eq!(observer.login_required.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_forbidden_does_not_touch_the_observer() {
    // 403 means "wrong role", not "dead credential". The session must
    // survive it.
    let base = serve(Router::new().route(
        "/admin-only",
        get(|| async {
            (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Admin access required" })),
            )
        }),
    ))
    .await;
    let gateway = gateway_for(base, CredentialCell::new());
    let observer = Arc::new(RecordingObserver::default());
    gateway.set_observer(observer.clone());
    gateway.set_location("/dashboard");

    let result: Result<Value, ApiError> = gateway.get("/admin-only").await;

    assert!(matches!(result, Err(ApiError::Forbidden { .. })));
    assert_eq!(observer.invalidated.load(Ordering::SeqCst), 0);
    assert_eq!(observer.login_required.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unauthorized_without_observer_still_classifies() {
    let base = serve(reject_all()).await;
    let gateway = gateway_for(base, CredentialCell::new());

    let result: Result<Value, ApiError> = gateway.get("/private").await;

    assert!(result.unwrap_err().is_unauthorized());
}
