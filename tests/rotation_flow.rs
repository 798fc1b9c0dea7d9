//! Integration tests for the access-token rotation flow.
//!
//! A wiremock server stands in for the hosted backend. Every test drives the
//! RotationController through its public API and asserts both the in-memory
//! state and the inserts that reached the wire:
//! 1. Rotation persists before swapping the displayed token
//! 2. Reads re-check expiry, so a stale token is never handed out
//! 3. A failed insert leaves the previous token untouched

use chrono::{Duration, Utc};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dojo_admin::rotation::RotationController;
use dojo_admin::store::backend::BackendClient;

fn backend(uri: &str) -> BackendClient {
    BackendClient::new(uri, "test-service-key").unwrap()
}

async fn accepting_server(expected_inserts: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/qr_tokens"))
        .and(body_string_contains("\"token\""))
        .and(body_string_contains("\"expires_at\""))
        .respond_with(ResponseTemplate::new(201))
        .expect(expected_inserts)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_regenerate_persists_before_swapping() {
    let server = accepting_server(1).await;
    let controller = RotationController::new(backend(&server.uri()));
    let now = Utc::now();

    let token = controller.regenerate(now).await.unwrap();

    assert_eq!(token.value.len(), 48);
    assert_eq!(token.expires_at, now + Duration::seconds(30));
    assert_eq!(controller.snapshot().await.unwrap().value, token.value);
    // Wiremock asserts the expected insert count on drop
}

#[tokio::test]
async fn test_consecutive_rotations_mint_distinct_tokens() {
    let server = accepting_server(2).await;
    let controller = RotationController::new(backend(&server.uri()));
    let now = Utc::now();

    let first = controller.regenerate(now).await.unwrap();
    let second = controller.regenerate(now + Duration::seconds(1)).await.unwrap();

    assert_ne!(first.value, second.value);
    assert_eq!(controller.snapshot().await.unwrap().value, second.value);
}

#[tokio::test]
async fn test_current_reuses_a_live_token() {
    let server = accepting_server(1).await;
    let controller = RotationController::new(backend(&server.uri()));
    let now = Utc::now();

    let first = controller.current(now).await.unwrap();
    let second = controller.current(now + Duration::seconds(5)).await.unwrap();

    // One mint covers both reads: the single expected insert proves it.
    assert_eq!(first.value, second.value);
}

#[tokio::test]
async fn test_current_never_serves_an_expired_token() {
    let server = accepting_server(2).await;
    let controller = RotationController::new(backend(&server.uri()));
    let now = Utc::now();

    let first = controller.current(now).await.unwrap();
    // 31 seconds later the ticker has not run; the read itself must rotate.
    let later = now + Duration::seconds(31);
    let second = controller.current(later).await.unwrap();

    assert_ne!(first.value, second.value);
    assert!(second.is_valid_at(later));
}

#[tokio::test]
async fn test_failed_insert_keeps_previous_token_and_expiry() {
    let server = MockServer::start().await;
    let controller = RotationController::new(backend(&server.uri()));
    let now = Utc::now();

    {
        let _accept = Mock::given(method("POST"))
            .and(path("/rest/v1/qr_tokens"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount_as_scoped(&server)
            .await;
        controller.regenerate(now).await.unwrap();
    }

    Mock::given(method("POST"))
        .and(path("/rest/v1/qr_tokens"))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage unavailable"))
        .mount(&server)
        .await;

    let before = controller.snapshot().await.unwrap();
    let result = controller.regenerate(now + Duration::seconds(5)).await;
    assert!(result.is_err());

    let after = controller.snapshot().await.unwrap();
    assert_eq!(before.value, after.value);
    assert_eq!(before.expires_at, after.expires_at);
}

#[tokio::test]
async fn test_tick_leaves_a_missing_token_alone() {
    let server = accepting_server(0).await;
    let controller = RotationController::new(backend(&server.uri()));

    let rotated = controller.tick(Utc::now()).await.unwrap();
    assert!(rotated.is_none());
}

#[tokio::test]
async fn test_tick_rotates_exactly_once_at_expiry() {
    let server = accepting_server(2).await;
    let controller = RotationController::new(backend(&server.uri()));
    let now = Utc::now();

    controller.regenerate(now).await.unwrap();

    // Still live one second before expiry.
    assert!(controller
        .tick(now + Duration::seconds(29))
        .await
        .unwrap()
        .is_none());

    // The expiry instant itself rotates.
    let rotated = controller.tick(now + Duration::seconds(30)).await.unwrap();
    assert!(rotated.is_some());

    // The replacement is live, so the next tick does nothing.
    assert!(controller
        .tick(now + Duration::seconds(31))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_custom_ttl_drives_the_expiry() {
    let server = accepting_server(1).await;
    let controller =
        RotationController::with_ttl(backend(&server.uri()), Duration::seconds(300));
    let now = Utc::now();

    let token = controller.regenerate(now).await.unwrap();
    assert_eq!(token.expires_at, now + Duration::seconds(300));
}

#[tokio::test]
async fn test_countdown_tracks_the_held_token() {
    let server = accepting_server(1).await;
    let controller = RotationController::new(backend(&server.uri()));
    let now = Utc::now();

    assert_eq!(controller.time_left(now).await, "--:--:--");

    controller.regenerate(now).await.unwrap();
    assert_eq!(
        controller.time_left(now + Duration::seconds(12)).await,
        "00:00:18"
    );
}
