//! Shared test utilities: an in-process mock of the FileFlow backend
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::{to_bytes, Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use parking_lot::Mutex;
use url::Url;
use uuid::Uuid;

use ::common::api::ApiClient;
use ::common::session::SessionStore;

/// One request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl Recorded {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

#[derive(Clone, Default)]
struct Shared {
    routes: Arc<Mutex<HashMap<(Method, String), (StatusCode, String)>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

pub struct MockBackend {
    pub url: Url,
    shared: Shared,
}

impl MockBackend {
    pub async fn spawn() -> Self {
        let shared = Shared::default();
        let app = Router::new().fallback(handle).with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: Url::parse(&format!("http://{}", addr)).unwrap(),
            shared,
        }
    }

    /// Answer `method path` with a JSON body.
    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: serde_json::Value) {
        self.respond_raw(method, path, status, body.to_string());
    }

    pub fn respond_raw(&self, method: Method, path: &str, status: StatusCode, body: impl Into<String>) {
        self.shared
            .routes
            .lock()
            .insert((method, path.to_string()), (status, body.into()));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.shared.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.shared.requests.lock().len()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    pub fn client(&self, session: SessionStore) -> ApiClient {
        ApiClient::new(&self.url, session).unwrap()
    }

    /// A client whose login redirects are counted.
    pub fn counting_client(&self, session: SessionStore) -> (ApiClient, Arc<AtomicUsize>) {
        let redirects = Arc::new(AtomicUsize::new(0));
        let counter = redirects.clone();
        let client = self.client(session).with_redirect(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (client, redirects)
    }

    /// Wire the three upload endpoints for a successful upload of `file_id`.
    pub fn accept_uploads(&self, file_id: Uuid) {
        let upload_url = self.url.join("/storage/uploads/object").unwrap();
        self.respond(
            Method::POST,
            "/api/v1/files/upload/init",
            StatusCode::OK,
            serde_json::json!({
                "upload_url": upload_url.as_str(),
                "storage_key": "uploads/object",
                "file_id": file_id,
            }),
        );
        self.respond_raw(Method::PUT, "/storage/uploads/object", StatusCode::OK, "");
        self.respond(
            Method::POST,
            &format!("/api/v1/files/upload/{}/complete", file_id),
            StatusCode::OK,
            serde_json::json!({ "message": "Upload completed", "file_id": file_id }),
        );
    }
}

async fn handle(State(shared): State<Shared>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let header_str = |name: header::HeaderName| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let path = parts.uri.path().to_string();
    shared.requests.lock().push(Recorded {
        method: parts.method.clone(),
        path: path.clone(),
        query: parts.uri.query().map(str::to_string),
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body,
    });

    let route = shared.routes.lock().get(&(parts.method, path)).cloned();
    match route {
        Some((status, body)) => (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            Body::from(body),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"detail":"Not Found"}"#,
        )
            .into_response(),
    }
}

/// A share as the backend reports it.
pub fn transaction_json(file_id: Uuid, transaction_id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": Uuid::new_v4(),
        "transaction_id": transaction_id,
        "file_id": file_id,
        "filename": "bill.pdf",
        "sender_name": "John",
        "recipient_name": null,
        "target_folder_name": "Bills",
        "status": "sent",
        "created_at": "2025-01-02T03:04:05.678901",
        "message": null,
    })
}

/// A session that already holds token `abc`.
pub fn signed_in() -> SessionStore {
    let session = SessionStore::in_memory();
    session.set_session(
        ::common::api::v1::User {
            name: "John".to_string(),
            ..Default::default()
        },
        "abc",
    );
    session
}
