use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};

use common::api::v1::{ProfileRequest, RegisterRequest, User};
use common::api::client::LogRedirect;
use common::api::{ApiClient, ApiError};
use common::auth;

use crate::op::{Op, OpContext};
use crate::state::{AppState, StateError};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to read password from stdin: {0}")]
    Stdin(#[from] std::io::Error),
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("Login failed: {0}")]
    LoginFailed(String),
}

impl AuthError {
    /// A 401 while signing in means bad credentials, not an expired session.
    fn sign_in(err: ApiError) -> Self {
        match err {
            ApiError::SessionExpired { detail } => AuthError::LoginFailed(detail),
            other => AuthError::Api(other),
        }
    }
}

/// The context's client, minus the expiry notice: a rejected sign-in is
/// reported by the op itself.
fn sign_in_client(ctx: &OpContext) -> ApiClient {
    ctx.client.clone().with_redirect(LogRedirect)
}

/// Use the flag if given, otherwise take the first line of stdin.
async fn password_or_stdin(password: &Option<String>) -> Result<String, AuthError> {
    let password = match password {
        Some(password) => password.clone(),
        None => {
            let mut line = String::new();
            BufReader::new(tokio::io::stdin())
                .read_line(&mut line)
                .await?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if password.is_empty() {
        return Err(AuthError::EmptyPassword);
    }
    Ok(password)
}

fn describe(user: &User) -> String {
    let mut lines = vec![format!("Name:  {}", user.name)];
    if let Some(email) = &user.email {
        lines.push(format!("Email: {}", email));
    }
    if let Some(plan) = &user.plan {
        lines.push(format!("Plan:  {}", plan));
    }
    lines.join("\n")
}

#[derive(Args, Debug, Clone)]
pub struct Login {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password (read from stdin when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

#[async_trait::async_trait]
impl Op for Login {
    type Error = AuthError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        // The session is persisted under the fileflow directory
        AppState::load(ctx.config_path.clone())?;

        let password = password_or_stdin(&self.password).await?;
        let user = auth::login(&sign_in_client(ctx), &self.email, &password)
            .await
            .map_err(AuthError::sign_in)?;
        Ok(format!("Logged in as {}", user.name))
    }
}

#[derive(Args, Debug, Clone)]
pub struct Register {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Phone number
    #[arg(long)]
    pub phone: String,

    /// Display name
    #[arg(long)]
    pub name: String,

    /// Account password (read from stdin when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

#[async_trait::async_trait]
impl Op for Register {
    type Error = AuthError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        AppState::load(ctx.config_path.clone())?;

        let password = password_or_stdin(&self.password).await?;
        let user = auth::register(
            &sign_in_client(ctx),
            RegisterRequest {
                email: self.email.clone(),
                phone: self.phone.clone(),
                name: self.name.clone(),
                password,
            },
        )
        .await
        .map_err(AuthError::sign_in)?;
        Ok(format!("Registered and logged in as {}", user.name))
    }
}

#[derive(Args, Debug, Clone)]
pub struct Logout;

#[async_trait::async_trait]
impl Op for Logout {
    type Error = AuthError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        if !ctx.session().is_authenticated() {
            return Ok("Not logged in".to_string());
        }
        auth::logout(&ctx.client);
        Ok("Logged out".to_string())
    }
}

#[derive(Args, Debug, Clone)]
pub struct Whoami;

#[async_trait::async_trait]
impl Op for Whoami {
    type Error = AuthError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        if !ctx.session().is_authenticated() {
            return Ok("Not logged in".to_string());
        }
        let user = ctx.client.call(ProfileRequest).await?;
        Ok(describe(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_skips_unknown_fields() {
        let user = User {
            name: "John".to_string(),
            email: Some("john@example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(describe(&user), "Name:  John\nEmail: john@example.com");
    }

    #[test]
    fn test_rejected_sign_in_is_login_failure() {
        let err = AuthError::sign_in(ApiError::SessionExpired {
            detail: "Incorrect email or password".to_string(),
        });
        assert!(matches!(err, AuthError::LoginFailed(_)));
        assert_eq!(err.to_string(), "Login failed: Incorrect email or password");

        let err = AuthError::sign_in(ApiError::UrlParse(url::ParseError::EmptyHost));
        assert!(matches!(err, AuthError::Api(_)));
    }

    #[tokio::test]
    async fn test_password_flag_wins() {
        let password = password_or_stdin(&Some("secret123".to_string()))
            .await
            .unwrap();
        assert_eq!(password, "secret123");

        assert!(matches!(
            password_or_stdin(&Some(String::new())).await,
            Err(AuthError::EmptyPassword)
        ));
    }
}
