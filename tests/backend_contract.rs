//! Wire-level contract tests for the hosted backend clients.
//!
//! Pins the exact paths, headers, query operators and payload shapes the
//! data API and the identity API receive, so a client refactor cannot
//! silently change what goes over the wire.

use chrono::{Duration, SecondsFormat, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dojo_admin::errors::AppError;
use dojo_admin::models::member::NewAccessLog;
use dojo_admin::models::token::NewQrToken;
use dojo_admin::store::backend::BackendClient;
use dojo_admin::store::identity::IdentityClient;

// ── data API ──

#[tokio::test]
async fn test_qr_token_insert_carries_key_headers_and_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/qr_tokens"))
        .and(header("apikey", "svc-key"))
        .and(header("authorization", "Bearer svc-key"))
        .and(header("prefer", "return=minimal"))
        .and(body_partial_json(json!({ "token": "cafe0123" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let store = BackendClient::new(&server.uri(), "svc-key").unwrap();
    store
        .insert_qr_token(&NewQrToken {
            token: "cafe0123",
            expires_at: Utc::now(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_guest_log_insert_is_authorized_and_anonymous() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/access_logs"))
        .and(body_partial_json(json!({
            "user_id": null,
            "result": "autorizado",
            "reason": "Acceso invitado manual (Admin)",
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let store = BackendClient::new(&server.uri(), "svc-key").unwrap();
    store
        .insert_access_log(&NewAccessLog::manual_guest(Utc::now()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_access_log_query_uses_postgrest_operators() {
    let server = MockServer::start().await;
    let since = Utc::now() - Duration::days(30);
    let since_filter = format!("gt.{}", since.to_rfc3339_opts(SecondsFormat::Millis, true));

    Mock::given(method("GET"))
        .and(path("/rest/v1/access_logs"))
        .and(query_param("select", "user_id,scanned_at"))
        .and(query_param("result", "eq.autorizado"))
        .and(query_param("scanned_at", since_filter))
        .and(query_param("order", "scanned_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "user_id": "00000000-0000-0000-0000-000000000001", "scanned_at": "2026-08-20T10:00:00Z" },
            { "user_id": null, "scanned_at": "2026-08-19T10:00:00Z" },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store = BackendClient::new(&server.uri(), "svc-key").unwrap();
    let rows = store.authorized_accesses_since(since).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].user_id, Some(Uuid::from_u128(1)));
    assert!(rows[1].user_id.is_none());
}

#[tokio::test]
async fn test_active_members_query_and_decode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/members_with_status"))
        .and(query_param("select", "user_id,first_name,last_name,email,status"))
        .and(query_param("status", "eq.activo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "user_id": "00000000-0000-0000-0000-000000000007",
            "first_name": "Ana",
            "last_name": "Silva",
            "email": "ana@example.com",
            "status": "activo",
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let store = BackendClient::new(&server.uri(), "svc-key").unwrap();
    let members = store.active_members().await.unwrap();

    assert_eq!(members.len(), 1);
    assert_eq!(members[0].full_name(), "Ana Silva");
    assert_eq!(members[0].email, "ana@example.com");
}

#[tokio::test]
async fn test_rejected_write_surfaces_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/qr_tokens"))
        .respond_with(ResponseTemplate::new(403).set_body_string("row-level security"))
        .expect(1)
        .mount(&server)
        .await;

    let store = BackendClient::new(&server.uri(), "svc-key").unwrap();
    let err = store
        .insert_qr_token(&NewQrToken {
            token: "cafe0123",
            expires_at: Utc::now(),
        })
        .await
        .unwrap_err();

    match err {
        AppError::BackendRejected { status, body, .. } => {
            assert_eq!(status.as_u16(), 403);
            assert_eq!(body, "row-level security");
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ── identity API ──

#[tokio::test]
async fn test_code_exchange_follows_the_pkce_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "pkce"))
        .and(header("apikey", "anon-key"))
        .and(body_partial_json(json!({
            "auth_code": "code-1",
            "code_verifier": "verifier-1",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-value",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": {
                "id": "00000000-0000-0000-0000-000000000009",
                "email": "admin@belezadojo.com",
            },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let identity = IdentityClient::new(&server.uri(), "anon-key").unwrap();
    let session = identity.exchange_code("code-1", "verifier-1").await.unwrap();

    assert_eq!(session.access_token, "jwt-value");
    assert_eq!(session.expires_in, 3600);
    assert_eq!(session.user.email.as_deref(), Some("admin@belezadojo.com"));
}

#[tokio::test]
async fn test_failed_exchange_is_a_sign_in_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid code"))
        .expect(1)
        .mount(&server)
        .await;

    let identity = IdentityClient::new(&server.uri(), "anon-key").unwrap();
    let err = identity
        .exchange_code("stale-code", "verifier-1")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::SignIn(_)));
}

#[test]
fn test_authorize_url_carries_the_pkce_challenge() {
    let identity = IdentityClient::new("https://project.example.co", "anon-key").unwrap();
    let url = identity.authorize_url("https://admin.belezadojo.com/auth/callback", "challenge123");

    assert!(url.starts_with("https://project.example.co/auth/v1/authorize?provider=google"));
    assert!(url.contains("redirect_to=https%3A%2F%2Fadmin.belezadojo.com%2Fauth%2Fcallback"));
    assert!(url.contains("code_challenge=challenge123"));
    assert!(url.contains("code_challenge_method=s256"));
    assert!(url.contains("prompt=select_account"));
    assert!(url.contains("access_type=offline"));
}
