use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use url::Url;

use super::error::ApiError;
use super::ApiRequest;
use crate::session::SessionStore;

/// Where the user is sent when the backend rejects their credentials.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self);
}

impl<F> LoginRedirect for F
where
    F: Fn() + Send + Sync,
{
    fn redirect_to_login(&self) {
        self()
    }
}

/// Default redirect: there is no UI to navigate, so just say so.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRedirect;

impl LoginRedirect for LogRedirect {
    fn redirect_to_login(&self) {
        tracing::warn!("session expired, login required");
    }
}

#[derive(Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
    session: SessionStore,
    redirect: Arc<dyn LoginRedirect>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("remote", &self.remote)
            .field("authenticated", &self.session.is_authenticated())
            .finish()
    }
}

impl ApiClient {
    pub fn new(remote: &Url, session: SessionStore) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(default_headers).build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
            session,
            redirect: Arc::new(LogRedirect),
        })
    }

    /// Replace the action taken when a response comes back 401.
    pub fn with_redirect(mut self, redirect: impl LoginRedirect + 'static) -> Self {
        self.redirect = Arc::new(redirect);
        self
    }

    pub async fn call<T: ApiRequest>(&self, request: T) -> Result<T::Response, ApiError> {
        let request_builder = request.build_request(&self.remote, &self.client)?;
        let response = self.dispatch(request_builder).await?;
        Ok(response.json::<T::Response>().await?)
    }

    /// Send a prepared request through the credential and session-expiry
    /// handling shared by every backend call. Returns only 2xx responses.
    pub async fn dispatch(&self, request_builder: RequestBuilder) -> Result<Response, ApiError> {
        let request_builder = match self.session.token() {
            Some(token) => request_builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request_builder,
        };

        let response = request_builder.send().await?;
        let status = response.status();
        tracing::debug!("{} {} -> {}", response.url().path(), status.as_u16(), status);

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            // A body we cannot read must not skip the clear and redirect
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::session_expired(&body);
            tracing::warn!("backend rejected credentials ({}), clearing session", err);
            self.session.clear_session();
            self.redirect.redirect_to_login();
            return Err(err);
        }

        let body = response.text().await?;
        Err(ApiError::backend(status, &body))
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    /// Get the underlying HTTP client for requests that bypass the backend,
    /// such as transfers to pre-signed storage URLs
    pub fn http_client(&self) -> &Client {
        &self.client
    }
}
