//! Integration tests for the admin surface.
//!
//! A stub server (axum) plays the remote API's admin side. The tests
//! check that each operation calls the right path, hands the payload
//! through, and alerts on the outcome.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use parkline::{MemoryStore, ParklineClient, Severity};
use serde_json::{Value, json};

// -- Stub server --------------------------------------------------------------

fn stub_routes() -> Router {
    Router::new()
        .route(
            "/admin/dashboard",
            get(|| async {
                Json(json!({
                    "statistics": {
                        "total_users": 42,
                        "total_lots": 3,
                        "occupied_spots": 17,
                        "available_spots": 133,
                    },
                    "recent_reservations": [],
                }))
            }),
        )
        .route(
            "/analytics/dashboard",
            get(|| async { Json(json!({ "revenue_by_lot": [] })) }),
        )
        .route(
            "/analytics/lots/7/analytics",
            get(|| async {
                Json(json!({
                    "lot_id": 7,
                    "occupancy_rate": 0.34,
                    "revenue": [12.0, 40.0],
                }))
            }),
        )
        .route(
            "/admin/users/3",
            put(|Json(body): Json<Value>| async move {
                if body["is_active"] == false {
                    Json(json!({ "message": "User deactivated successfully" }))
                        .into_response()
                } else {
                    (
                        StatusCode::FORBIDDEN,
                        Json(json!({ "error": "Cannot modify admin accounts" })),
                    )
                        .into_response()
                }
            }),
        )
}

async fn client() -> ParklineClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = listener.local_addr().expect("should have local addr");
    tokio::spawn(async move {
        axum::serve(listener, stub_routes())
            .await
            .expect("server should run");
    });

    ParklineClient::builder()
        .base_url(&format!("http://{addr}"))
        .store(Box::new(MemoryStore::new()))
        .build()
}

// =============================================================================
// Dashboard and analytics
// =============================================================================

#[tokio::test]
async fn test_dashboard_returns_admin_statistics() {
    let client = client().await;

    let dashboard = client.admin().dashboard().await.expect("should fetch");

    assert_eq!(dashboard["statistics"]["total_users"], 42);
    assert_eq!(dashboard["statistics"]["available_spots"], 133);
}

#[tokio::test]
async fn test_lot_analytics_reaches_the_per_lot_route() {
    let client = client().await;

    let analytics = client
        .admin()
        .lot_analytics(7)
        .await
        .expect("should fetch");

    assert_eq!(analytics["lot_id"], 7);
    assert_eq!(analytics["occupancy_rate"], 0.34);
}

#[tokio::test]
async fn test_overview_passes_analytics_payload_through() {
    let client = client().await;

    let overview = client.admin().overview().await.expect("should fetch");

    assert!(overview["revenue_by_lot"].is_array());
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_set_user_active_reports_server_message() {
    let client = client().await;

    client
        .admin()
        .set_user_active(3, false)
        .await
        .expect("should deactivate");

    assert_eq!(
        client.notifier().current().map(|a| a.message),
        Some("User deactivated successfully".to_string())
    );
}

#[tokio::test]
async fn test_forbidden_admin_call_alerts_with_server_wording() {
    let client = client().await;

    let result = client.admin().set_user_active(3, true).await;

    assert!(result.is_err());
    assert_eq!(
        client.notifier().current().map(|a| (a.message, a.severity)),
        Some((
            "Cannot modify admin accounts".to_string(),
            Severity::Danger
        ))
    );
}
