mod common;

use std::sync::atomic::Ordering;

use axum::http::{Method, StatusCode};
use serde_json::json;

use ::common::api::v1::{ListFoldersRequest, StorageRequest};
use ::common::api::{ApiClient, ApiError};
use ::common::auth;
use ::common::session::SessionStore;

use crate::common::{signed_in, MockBackend};

#[tokio::test]
async fn test_login_stores_token_and_later_calls_carry_it() {
    let backend = MockBackend::spawn().await;
    backend.respond(
        Method::POST,
        "/api/v1/auth/login",
        StatusCode::OK,
        json!({ "user": { "name": "John" }, "accessToken": "abc" }),
    );
    backend.respond(
        Method::GET,
        "/api/v1/users/storage",
        StatusCode::OK,
        json!({ "used_gb": 1.5, "quota_gb": 5.0, "percentage": 30.0 }),
    );

    let session = SessionStore::in_memory();
    let client = backend.client(session.clone());

    let user = auth::login(&client, "john@example.com", "secret123")
        .await
        .unwrap();
    assert_eq!(user.name, "John");
    assert_eq!(session.token().as_deref(), Some("abc"));
    assert_eq!(session.user().unwrap().name, "John");

    let usage = client.call(StorageRequest).await.unwrap();
    assert_eq!(usage.percentage, 30.0);

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);

    let login = &requests[0];
    assert_eq!(login.authorization, None);
    assert_eq!(
        login.content_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(
        std::str::from_utf8(&login.body).unwrap(),
        "username=john%40example.com&password=secret123"
    );

    assert_eq!(requests[1].authorization.as_deref(), Some("Bearer abc"));
}

#[tokio::test]
async fn test_register_replaces_session() {
    let backend = MockBackend::spawn().await;
    backend.respond(
        Method::POST,
        "/api/v1/auth/register",
        StatusCode::CREATED,
        json!({
            "access_token": "fresh",
            "refresh_token": "r",
            "token_type": "bearer",
            "user": { "email": "jane@example.com", "name": "Jane", "plan": "free" }
        }),
    );

    let session = signed_in();
    let client = backend.client(session.clone());

    auth::register(
        &client,
        ::common::api::v1::RegisterRequest {
            email: "jane@example.com".to_string(),
            phone: "+15550100".to_string(),
            name: "Jane".to_string(),
            password: "hunter22".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(session.token().as_deref(), Some("fresh"));
    assert_eq!(session.user().unwrap().name, "Jane");

    let body = backend.requests()[0].json();
    assert_eq!(body["email"], "jane@example.com");
    assert_eq!(body["phone"], "+15550100");

    auth::logout(&client);
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_unauthenticated_calls_send_no_header() {
    let backend = MockBackend::spawn().await;
    backend.respond(Method::GET, "/api/v1/folders", StatusCode::OK, json!([]));

    let client = backend.client(SessionStore::in_memory());
    let folders = client.call(ListFoldersRequest).await.unwrap();
    assert!(folders.is_empty());
    assert_eq!(backend.requests()[0].authorization, None);
}

#[tokio::test]
async fn test_401_clears_session_and_redirects_once() {
    for path in ["/api/v1/folders", "/api/v1/users/storage"] {
        let backend = MockBackend::spawn().await;
        backend.respond(
            Method::GET,
            path,
            StatusCode::UNAUTHORIZED,
            json!({ "detail": "Could not validate credentials" }),
        );

        let session = signed_in();
        let (client, redirects) = backend.counting_client(session.clone());

        let err = if path.ends_with("folders") {
            client.call(ListFoldersRequest).await.map(|_| ()).unwrap_err()
        } else {
            client.call(StorageRequest).await.map(|_| ()).unwrap_err()
        };

        assert!(err.is_session_expired(), "{path}: {err:?}");
        assert!(!session.is_authenticated());
        assert_eq!(session.session().user, None);
        assert_eq!(redirects.load(Ordering::SeqCst), 1);
        assert_eq!(backend.request_count(), 1);
    }
}

#[tokio::test]
async fn test_rejected_login_keeps_backend_detail() {
    let backend = MockBackend::spawn().await;
    backend.respond(
        Method::POST,
        "/api/v1/auth/login",
        StatusCode::UNAUTHORIZED,
        json!({ "detail": "Incorrect email or password" }),
    );

    let session = signed_in();
    let (client, redirects) = backend.counting_client(session.clone());

    let err = auth::login(&client, "john@example.com", "wrong")
        .await
        .unwrap_err();

    match &err {
        ApiError::SessionExpired { detail } => assert_eq!(detail, "Incorrect email or password"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.to_string(), "not authorized: Incorrect email or password");
    assert!(!session.is_authenticated());
    assert_eq!(redirects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_backend_error_detail_passes_through() {
    let backend = MockBackend::spawn().await;
    backend.respond(
        Method::GET,
        "/api/v1/users/storage",
        StatusCode::BAD_REQUEST,
        json!({ "detail": "Account is deactivated" }),
    );

    let session = signed_in();
    let (client, redirects) = backend.counting_client(session.clone());

    match client.call(StorageRequest).await {
        Err(ApiError::Backend { status, detail }) => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(detail, "Account is deactivated");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    // Only a 401 touches the session
    assert!(session.is_authenticated());
    assert_eq!(redirects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = url::Url::parse(&format!("http://{}", addr)).unwrap();
    let session = signed_in();
    let client = ApiClient::new(&url, session.clone()).unwrap();

    let err = client.call(StorageRequest).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
    assert!(session.is_authenticated());
}
