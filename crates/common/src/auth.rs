//! Sign-in flows. Each one talks to the backend, then replaces or clears the
//! whole session record.

use crate::api::v1::auth::{LoginRequest, RegisterRequest, User};
use crate::api::{ApiClient, ApiError};

pub async fn login(client: &ApiClient, username: &str, password: &str) -> Result<User, ApiError> {
    let response = client
        .call(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })
        .await?;

    tracing::info!("logged in as {}", response.user.name);
    client
        .session()
        .set_session(response.user.clone(), response.access_token);
    Ok(response.user)
}

pub async fn register(client: &ApiClient, request: RegisterRequest) -> Result<User, ApiError> {
    let response = client.call(request).await?;

    tracing::info!("registered {}", response.user.name);
    client
        .session()
        .set_session(response.user.clone(), response.access_token);
    Ok(response.user)
}

pub fn logout(client: &ApiClient) {
    client.session().clear_session();
    tracing::info!("logged out");
}
