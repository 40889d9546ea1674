#[allow(clippy::module_inception)]
mod client;
mod error;

pub use client::{ApiClient, LogRedirect, LoginRedirect};
pub use error::ApiError;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

/// A single backend operation: how to build it and what it answers with.
pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError>;
}

/// Join an `/api/v1`-relative path onto the remote.
pub(crate) fn endpoint(base_url: &Url, path: &str) -> Result<Url, ApiError> {
    Ok(base_url.join(&format!("{}/{}", super::API_PREFIX, path.trim_start_matches('/')))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_is_rooted_at_prefix() {
        let base = Url::parse("http://localhost:8000").unwrap();
        let url = endpoint(&base, "files/upload/init").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/files/upload/init");

        let url = endpoint(&base, "/shares/sent").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/shares/sent");
    }

    #[test]
    fn test_endpoint_ignores_base_path() {
        let base = Url::parse("https://fileflow.example.com/dashboard/").unwrap();
        let url = endpoint(&base, "folders").unwrap();
        assert_eq!(url.as_str(), "https://fileflow.example.com/api/v1/folders");
    }
}
