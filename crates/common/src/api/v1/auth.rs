use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::client::{endpoint, ApiError, ApiRequest};

/// Identity record returned alongside an access token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub phone: String,
    pub name: String,
    pub password: String,
}

impl ApiRequest for RegisterRequest {
    type Response = TokenResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.post(endpoint(base_url, "auth/register")?).json(&self))
    }
}

/// Credentials are sent form-encoded, as an OAuth2 password grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl ApiRequest for LoginRequest {
    type Response = TokenResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.post(endpoint(base_url, "auth/login")?).form(&self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_accepts_both_spellings() {
        let snake: TokenResponse = serde_json::from_str(
            r#"{"access_token":"abc","refresh_token":"r","token_type":"bearer",
                "user":{"id":"5f0c8a59-3f2e-4c1b-9d1e-0c3b8c1f7a10","email":"john@example.com","name":"John","plan":"free"}}"#,
        )
        .unwrap();
        assert_eq!(snake.access_token, "abc");
        assert_eq!(snake.user.email.as_deref(), Some("john@example.com"));

        let camel: TokenResponse =
            serde_json::from_str(r#"{"user":{"name":"John"},"accessToken":"abc"}"#).unwrap();
        assert_eq!(camel.access_token, "abc");
        assert_eq!(camel.user.name, "John");
        assert!(camel.refresh_token.is_none());
    }
}
