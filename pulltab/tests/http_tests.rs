//! HTTP API tests through the full router.
//!
//! # Requirements
//!
//! Docker must be running to execute these tests.

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code uses expect for clear failure messages

mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use common::{always_wins, never_wins, Harness};
use pulltab::api::AdminToken;
use pulltab::server::{build_router, AppState};
use pulltab::{Coins, LedgerEntry, PlayerId, PullTabDesign, TicketView, Wallet};
use serde_json::{json, Value};

const ADMIN_SECRET: &str = "admin-secret";

fn player_header() -> HeaderName {
    HeaderName::from_static("x-player-id")
}

fn admin_header() -> HeaderName {
    HeaderName::from_static("x-admin-token")
}

fn player_value(player: PlayerId) -> HeaderValue {
    HeaderValue::from_str(&player.to_string()).unwrap()
}

fn admin_value() -> HeaderValue {
    HeaderValue::from_static(ADMIN_SECRET)
}

fn server(harness: &Harness) -> TestServer {
    let state = AppState::new(
        harness.service.clone(),
        AdminToken::new(Some(ADMIN_SECRET.to_string())),
    );
    TestServer::new(build_router(state)).expect("Failed to build test server")
}

async fn funded_player(server: &TestServer, coins: u64) -> PlayerId {
    let player = PlayerId::new();
    server
        .post(&format!("/api/admin/wallets/{player}/credit"))
        .add_header(admin_header(), admin_value())
        .json(&json!({ "amount": coins }))
        .await
        .assert_status_ok();
    player
}

async fn create_design(server: &TestServer, body: &Value) -> PullTabDesign {
    let response = server
        .post("/api/admin/designs")
        .add_header(admin_header(), admin_value())
        .json(body)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<PullTabDesign>()
}

#[tokio::test]
async fn test_health_and_readiness() {
    let harness = Harness::start().await;
    let server = server(&harness);

    server.get("/health").await.assert_status_ok();

    let ready = server.get("/ready").await;
    ready.assert_status_ok();
    assert_eq!(ready.json::<Value>()["ready"], json!(true));

    // No recorder installed in tests.
    server
        .get("/metrics")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_full_play_through_http() {
    let harness = Harness::start().await;
    let server = server(&harness);
    let design = create_design(&server, &serde_json::to_value(always_wins(10, 25)).unwrap()).await;
    let player = funded_player(&server, 10).await;

    let catalogue = server.get("/api/designs").await.json::<Vec<PullTabDesign>>();
    assert_eq!(catalogue.len(), 1);

    let purchase = server
        .post(&format!("/api/designs/{}/purchase", design.id))
        .add_header(player_header(), player_value(player))
        .await;
    purchase.assert_status(StatusCode::CREATED);
    let ticket = purchase.json::<TicketView>();
    assert!(ticket.tabs.iter().all(|tab| tab.value.is_none()));

    let body = server
        .get(&format!("/api/tickets/{}", ticket.id))
        .add_header(player_header(), player_value(player))
        .await
        .json::<Value>();
    assert!(body["tabs"].as_array().unwrap().iter().all(|tab| tab["value"].is_null()));

    server
        .post(&format!("/api/tickets/{}/reveal", ticket.id))
        .add_header(player_header(), player_value(player))
        .json(&json!({ "tab_index": 0 }))
        .await
        .assert_status_ok();

    let revealed = server
        .post(&format!("/api/tickets/{}/reveal-all", ticket.id))
        .add_header(player_header(), player_value(player))
        .await
        .json::<TicketView>();
    assert_eq!(revealed.prize, Some(Coins::new(25)));

    server
        .post(&format!("/api/tickets/{}/claim", ticket.id))
        .add_header(player_header(), player_value(player))
        .await
        .assert_status_ok();

    let again = server
        .post(&format!("/api/tickets/{}/claim", ticket.id))
        .add_header(player_header(), player_value(player))
        .await;
    again.assert_status(StatusCode::CONFLICT);
    assert_eq!(again.json::<Value>()["code"], json!("ALREADY_CLAIMED"));

    let wallet = server
        .get("/api/wallet")
        .add_header(player_header(), player_value(player))
        .await
        .json::<Wallet>();
    assert_eq!(wallet.balance, Coins::new(25));

    let ledger = server
        .get("/api/wallet/ledger")
        .add_query_param("limit", 2)
        .add_header(player_header(), player_value(player))
        .await
        .json::<Vec<LedgerEntry>>();
    assert_eq!(ledger.len(), 2);

    let tickets = server
        .get("/api/tickets")
        .add_header(player_header(), player_value(player))
        .await
        .json::<Vec<TicketView>>();
    assert_eq!(tickets.len(), 1);
}

#[tokio::test]
async fn test_error_status_codes() {
    let harness = Harness::start().await;
    let server = server(&harness);
    let design = create_design(&server, &serde_json::to_value(never_wins(5)).unwrap()).await;
    let broke = PlayerId::new();

    server
        .post(&format!("/api/designs/{}/purchase", design.id))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let poor = server
        .post(&format!("/api/designs/{}/purchase", design.id))
        .add_header(player_header(), player_value(broke))
        .await;
    poor.assert_status(StatusCode::PAYMENT_REQUIRED);
    assert_eq!(poor.json::<Value>()["code"], json!("INSUFFICIENT_BALANCE"));

    server
        .get(&format!("/api/tickets/{}", uuid::Uuid::new_v4()))
        .add_header(player_header(), player_value(broke))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let player = funded_player(&server, 5).await;
    let ticket = server
        .post(&format!("/api/designs/{}/purchase", design.id))
        .add_header(player_header(), player_value(player))
        .await
        .json::<TicketView>();

    server
        .post(&format!("/api/tickets/{}/reveal", ticket.id))
        .add_header(player_header(), player_value(player))
        .json(&json!({ "tab_index": 99 }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    server
        .post(&format!("/api/tickets/{}/reveal", ticket.id))
        .add_header(player_header(), player_value(broke))
        .json(&json!({ "tab_index": 0 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_requests_get_json_errors() {
    let harness = Harness::start().await;
    let server = server(&harness);
    let design = create_design(&server, &serde_json::to_value(never_wins(5)).unwrap()).await;
    let player = funded_player(&server, 5).await;
    let ticket = server
        .post(&format!("/api/designs/{}/purchase", design.id))
        .add_header(player_header(), player_value(player))
        .await
        .json::<TicketView>();

    let negative = server
        .post(&format!("/api/tickets/{}/reveal", ticket.id))
        .add_header(player_header(), player_value(player))
        .json(&json!({ "tab_index": -1 }))
        .await;
    negative.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(negative.json::<Value>()["code"], json!("INVALID_BODY"));

    let bad_id = server
        .get("/api/tickets/not-a-ticket")
        .add_header(player_header(), player_value(player))
        .await;
    bad_id.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(bad_id.json::<Value>()["code"], json!("INVALID_PATH"));

    let bad_credit = server
        .post(&format!("/api/admin/wallets/{player}/credit"))
        .add_header(admin_header(), admin_value())
        .json(&json!({ "amount": -5 }))
        .await;
    bad_credit.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(bad_credit.json::<Value>()["code"], json!("INVALID_BODY"));

    let bad_page = server
        .get("/api/wallet/ledger")
        .add_query_param("limit", "many")
        .add_header(player_header(), player_value(player))
        .await;
    bad_page.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(bad_page.json::<Value>()["code"], json!("INVALID_QUERY"));

    // Rejected input leaves the ticket untouched.
    let unchanged = server
        .get(&format!("/api/tickets/{}", ticket.id))
        .add_header(player_header(), player_value(player))
        .await
        .json::<TicketView>();
    assert!(unchanged.tabs.iter().all(|tab| tab.value.is_none()));
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let harness = Harness::start().await;
    let server = server(&harness);

    server
        .get("/api/admin/designs")
        .await
        .assert_status(StatusCode::FORBIDDEN);

    server
        .get("/api/admin/designs")
        .add_header(admin_header(), HeaderValue::from_static("wrong"))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let invalid = server
        .post("/api/admin/designs")
        .add_header(admin_header(), admin_value())
        .json(&json!({
            "name": "Broken",
            "cost": 1,
            "tab_count": 0,
            "win_probability": 0.5,
            "min_prize": 1,
            "max_prize": 2
        }))
        .await;
    invalid.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(invalid.json::<Value>()["code"], json!("INVALID_DESIGN"));

    let design = create_design(&server, &serde_json::to_value(never_wins(3)).unwrap()).await;

    let deactivated = server
        .post(&format!("/api/admin/designs/{}/deactivate", design.id))
        .add_header(admin_header(), admin_value())
        .await
        .json::<PullTabDesign>();
    assert!(!deactivated.active);

    server
        .get(&format!("/api/designs/{}", design.id))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let all = server
        .get("/api/admin/designs")
        .add_header(admin_header(), admin_value())
        .await
        .json::<Vec<PullTabDesign>>();
    assert_eq!(all.len(), 1);

    let mut spec = serde_json::to_value(never_wins(3)).unwrap();
    spec["name"] = json!("Renamed");
    let renamed = server
        .put(&format!("/api/admin/designs/{}", design.id))
        .add_header(admin_header(), admin_value())
        .json(&spec)
        .await
        .json::<PullTabDesign>();
    assert_eq!(renamed.name, "Renamed");

    server
        .post(&format!("/api/admin/designs/{}/activate", design.id))
        .add_header(admin_header(), admin_value())
        .await
        .assert_status_ok();
    server
        .get(&format!("/api/designs/{}", design.id))
        .await
        .assert_status_ok();
}
