//! Mock service tests for the REST backend.
//!
//! These tests use wiremock to stand in for the account, document and blob
//! APIs, so they run without network access or a real project.

use chrono::Local;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nudge_core::error::{AuthError, RemoteError};
use nudge_core::{
    AccessToken, AuthProvider, Backend, BlobStore, Collection, Credentials, DocumentRef,
    DocumentStore, Email, Error, Fields, Filter, RecordDraft, RecordId, RefreshToken,
    SessionToken, UserId,
};
use nudge_http::{HttpBackend, HttpConfig};
use nudge_sync::{RecordStore, ReloadOutcome, SyncConfig};

const DOCUMENTS: &str = "/v1/projects/demo/databases/(default)/documents";

/// Point every API at the mock server.
fn mock_config(server: &MockServer) -> HttpConfig {
    HttpConfig::new("key123", "demo").with_base_url(Url::parse(&server.uri()).unwrap())
}

fn credentials() -> Credentials {
    Credentials::new(Email::new("alice@example.com").unwrap(), "hunter22")
}

async fn mount_sign_in(server: &MockServer, id_token: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .and(query_param("key", "key123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "u1",
            "email": "alice@example.com",
            "idToken": id_token,
            "refreshToken": "refresh-1"
        })))
        .mount(server)
        .await;
}

/// A backend signed in as `u1` holding ID token `id-1`.
async fn signed_in(server: &MockServer) -> Backend {
    mount_sign_in(server, "id-1").await;
    let backend = HttpBackend::new(mock_config(server)).unwrap().into_backend();
    backend.auth.sign_in(&credentials()).await.unwrap();
    backend
}

fn reminder_document(id: &str, owner: &str, label: &str, at: &str) -> serde_json::Value {
    json!({
        "name": format!("projects/demo/databases/(default)/documents/reminders/{id}"),
        "fields": {
            "label": {"stringValue": label},
            "displayTimestamp": {"stringValue": "Jan 1, 2030 at 9:00 AM"},
            "ownerId": {"stringValue": owner},
            "reminderTime": {"timestampValue": at}
        }
    })
}

fn error_body(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "error": {"code": status, "message": message}
    }))
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_sign_in_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .and(body_json(json!({
            "email": "alice@example.com",
            "password": "hunter22",
            "returnSecureToken": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "u1",
            "idToken": "id-1",
            "refreshToken": "refresh-1"
        })))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(mock_config(&server)).unwrap();
    let user = backend.auth().sign_in(&credentials()).await.unwrap();

    assert_eq!(user.as_str(), "u1");
    assert_eq!(backend.auth().current_user(), Some(user));
    let token = backend.auth().session_token().unwrap();
    assert_eq!(token.access_token.as_str(), "id-1");
    assert_eq!(token.refresh_token.unwrap().as_str(), "refresh-1");
}

#[tokio::test]
async fn test_sign_up_email_in_use() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(error_body(400, "EMAIL_EXISTS"))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(mock_config(&server)).unwrap();
    let err = backend.auth().sign_up(&credentials()).await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::EmailInUse)));
    assert_eq!(backend.auth().current_user(), None);
}

#[tokio::test]
async fn test_sign_in_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(error_body(400, "INVALID_LOGIN_CREDENTIALS"))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(mock_config(&server)).unwrap();
    let err = backend.auth().sign_in(&credentials()).await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_sign_up_weak_password_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(error_body(
            400,
            "WEAK_PASSWORD : Password should be at least 6 characters",
        ))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(mock_config(&server)).unwrap();
    let err = backend.auth().sign_up(&credentials()).await.unwrap_err();

    match err {
        Error::Auth(AuthError::WeakPassword { reason }) => {
            assert!(reason.contains("at least 6"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_password_reset_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:sendOobCode"))
        .and(body_json(json!({
            "requestType": "PASSWORD_RESET",
            "email": "alice@example.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "alice@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(mock_config(&server)).unwrap();
    backend
        .auth()
        .send_password_reset(&Email::new("alice@example.com").unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_sign_out_is_local() {
    let server = MockServer::start().await;
    let backend = signed_in(&server).await;

    backend.auth.sign_out().await.unwrap();

    assert_eq!(backend.auth.current_user(), None);
    let err = backend
        .documents
        .get(&DocumentRef::new(
            Collection::reminders(),
            RecordId::new("r1").unwrap(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotAuthenticated));
}

#[tokio::test]
async fn test_restore_exchanges_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id_token": "id-2",
            "refresh_token": "refresh-2",
            "user_id": "u1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(mock_config(&server)).unwrap();
    let user = backend
        .auth()
        .restore(SessionToken {
            user_id: UserId::new("u1").unwrap(),
            access_token: AccessToken::new("id-stale"),
            refresh_token: Some(RefreshToken::new("refresh-1")),
        })
        .await
        .unwrap();

    assert_eq!(user.as_str(), "u1");
    let token = backend.auth().session_token().unwrap();
    assert_eq!(token.access_token.as_str(), "id-2");
}

#[tokio::test]
async fn test_restore_rejected_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .respond_with(error_body(400, "INVALID_REFRESH_TOKEN"))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(mock_config(&server)).unwrap();
    let err = backend
        .auth()
        .restore(SessionToken {
            user_id: UserId::new("u1").unwrap(),
            access_token: AccessToken::new("id-stale"),
            refresh_token: Some(RefreshToken::new("refresh-1")),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::SessionExpired)));
    assert_eq!(backend.auth().current_user(), None);
}

// ============================================================================
// Document Tests
// ============================================================================

#[tokio::test]
async fn test_query_sends_filter_and_token() {
    let server = MockServer::start().await;
    let backend = signed_in(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:runQuery")))
        .and(header("authorization", "Bearer id-1"))
        .and(body_json(json!({
            "structuredQuery": {
                "from": [{"collectionId": "reminders"}],
                "where": {
                    "fieldFilter": {
                        "field": {"fieldPath": "ownerId"},
                        "op": "EQUAL",
                        "value": {"stringValue": "u1"}
                    }
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"readTime": "2030-01-01T00:00:00Z"},
            {"document": reminder_document("r1", "u1", "Walk", "2030-01-01T09:00:00Z")},
            {"document": {
                "name": "projects/demo/databases/(default)/documents/profiles/u1",
                "fields": {}
            }}
        ])))
        .mount(&server)
        .await;

    let documents = backend
        .documents
        .query(&Collection::reminders(), &Filter::eq("ownerId", "u1"))
        .await
        .unwrap();

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].reference.id.as_str(), "r1");
    assert_eq!(documents[0].fields.get_str("label").unwrap(), "Walk");
}

#[tokio::test]
async fn test_get_missing_document() {
    let server = MockServer::start().await;
    let backend = signed_in(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{DOCUMENTS}/reminders/gone")))
        .respond_with(error_body(404, "Document not found"))
        .mount(&server)
        .await;

    let found = backend
        .documents
        .get(&DocumentRef::new(
            Collection::reminders(),
            RecordId::new("gone").unwrap(),
        ))
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_update_masks_fields_and_requires_existing() {
    let server = MockServer::start().await;
    let backend = signed_in(&server).await;

    Mock::given(method("PATCH"))
        .and(path(format!("{DOCUMENTS}/reminders/gone")))
        .and(query_param("updateMask.fieldPaths", "label"))
        .and(query_param("currentDocument.exists", "true"))
        .respond_with(error_body(404, "No document to update"))
        .expect(1)
        .mount(&server)
        .await;

    let err = backend
        .documents
        .update(
            &DocumentRef::new(Collection::reminders(), RecordId::new("gone").unwrap()),
            &Fields::new().with("label", "Walk"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RecordNotFound { id } if id == "gone"));
}

#[tokio::test]
async fn test_delete_missing_is_ok() {
    let server = MockServer::start().await;
    let backend = signed_in(&server).await;

    Mock::given(method("DELETE"))
        .and(path(format!("{DOCUMENTS}/reminders/gone")))
        .respond_with(error_body(404, "not found"))
        .mount(&server)
        .await;

    backend
        .documents
        .delete(&DocumentRef::new(
            Collection::reminders(),
            RecordId::new("gone").unwrap(),
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unavailable_service_is_retryable() {
    let server = MockServer::start().await;
    let backend = signed_in(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:runQuery")))
        .respond_with(error_body(503, "The service is currently unavailable."))
        .mount(&server)
        .await;

    let err = backend
        .documents
        .query(&Collection::reminders(), &Filter::eq("ownerId", "u1"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::RemoteUnavailable(RemoteError::Http { status: 503, .. })
    ));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_expired_token_is_refreshed_once() {
    let server = MockServer::start().await;
    let backend = signed_in(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{DOCUMENTS}/reminders/r1")))
        .and(header("authorization", "Bearer id-1"))
        .respond_with(error_body(401, "Request had invalid authentication credentials."))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id_token": "id-2",
            "refresh_token": "refresh-2",
            "user_id": "u1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCUMENTS}/reminders/r1")))
        .and(header("authorization", "Bearer id-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reminder_document(
            "r1",
            "u1",
            "Walk",
            "2030-01-01T09:00:00Z",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let document = backend
        .documents
        .get(&DocumentRef::new(
            Collection::reminders(),
            RecordId::new("r1").unwrap(),
        ))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(document.fields.get_str("label").unwrap(), "Walk");
    assert_eq!(
        backend.auth.session_token().unwrap().access_token.as_str(),
        "id-2"
    );
}

#[tokio::test]
async fn test_rejected_refresh_signs_out() {
    let server = MockServer::start().await;
    let backend = signed_in(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{DOCUMENTS}/reminders/r1")))
        .respond_with(error_body(401, "INVALID_ID_TOKEN"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .respond_with(error_body(400, "TOKEN_EXPIRED"))
        .mount(&server)
        .await;

    let err = backend
        .documents
        .get(&DocumentRef::new(
            Collection::reminders(),
            RecordId::new("r1").unwrap(),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::SessionExpired)));
    assert_eq!(backend.auth.current_user(), None);
}

// ============================================================================
// Blob Tests
// ============================================================================

#[tokio::test]
async fn test_upload_returns_download_url() {
    let server = MockServer::start().await;
    let backend = signed_in(&server).await;

    Mock::given(method("POST"))
        .and(path("/v0/b/demo.appspot.com/o"))
        .and(query_param("name", "profileImages/u1.png"))
        .and(query_param("uploadType", "media"))
        .and(header("content-type", "image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "profileImages/u1.png",
            "downloadTokens": "tok-a,tok-b"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v0/b/demo.appspot.com/o/profileImages%2Fu1.png"))
        .and(query_param("alt", "media"))
        .and(query_param("token", "tok-a"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, 0x50, 0x4E, 0x47]))
        .mount(&server)
        .await;

    let url = backend
        .blobs
        .upload("profileImages/u1.png", vec![0x89, 0x50, 0x4E, 0x47], "image/png")
        .await
        .unwrap();
    assert!(url.contains("profileImages%2Fu1.png"));
    assert!(url.ends_with("token=tok-a"));

    let bytes = backend.blobs.download(&url).await.unwrap();
    assert_eq!(bytes, vec![0x89, 0x50, 0x4E, 0x47]);
}

#[tokio::test]
async fn test_download_missing_blob() {
    let server = MockServer::start().await;
    let backend = signed_in(&server).await;

    Mock::given(method("GET"))
        .and(path("/v0/b/demo.appspot.com/o/profileImages%2Fgone.png"))
        .respond_with(error_body(404, "Not Found."))
        .mount(&server)
        .await;

    let url = format!(
        "{}/v0/b/demo.appspot.com/o/profileImages%2Fgone.png?alt=media&token=t",
        server.uri()
    );
    let err = backend.blobs.download(&url).await.unwrap_err();
    assert!(matches!(err, Error::BlobNotFound { .. }));
}

// ============================================================================
// Record Store Tests
// ============================================================================

#[tokio::test]
async fn test_record_store_over_rest() {
    let server = MockServer::start().await;
    let backend = signed_in(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:runQuery")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"document": reminder_document("r2", "u1", "Feed", "2030-01-02T09:00:00Z")},
            {"document": reminder_document("r1", "u1", "Walk", "2030-01-01T09:00:00Z")},
            {"document": reminder_document("r3", "u2", "Theirs", "2030-01-01T08:00:00Z")}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path_regex(format!(
            r"^{}/reminders/[A-Za-z0-9]+$",
            regex_escape(DOCUMENTS)
        )))
        .and(header("authorization", "Bearer id-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let store = RecordStore::new(backend.documents.clone(), SyncConfig::default());
    let outcome = store
        .on_sign_in(backend.auth.current_user().unwrap())
        .await
        .unwrap();
    assert_eq!(outcome, ReloadOutcome::Applied(2));

    let labels: Vec<_> = store.records().iter().map(|r| r.label.clone()).collect();
    assert_eq!(labels, vec!["Walk", "Feed"]);

    let at = Local::now() + chrono::Duration::hours(1);
    store.create(RecordDraft::new("Call", at)).await.unwrap();
    assert_eq!(store.status().last_error, None);
}

/// Escape the regex metacharacters that occur in resource paths.
fn regex_escape(s: &str) -> String {
    s.replace('(', r"\(").replace(')', r"\)")
}
