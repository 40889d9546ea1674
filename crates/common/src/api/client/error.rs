use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend rejected our credentials. The session has already been
    /// cleared and the login redirect fired by the time this is returned.
    /// `detail` is the backend's reason, e.g. a wrong password on login.
    #[error("not authorized: {detail}")]
    SessionExpired { detail: String },
    #[error("{detail} (HTTP {status})")]
    Backend { status: StatusCode, detail: String },
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl ApiError {
    /// Build a backend error from a failed response body, preferring the
    /// `detail` field the backend attaches to its errors.
    pub fn backend(status: StatusCode, body: &str) -> Self {
        Self::Backend {
            status,
            detail: detail_of(status, body),
        }
    }

    /// Build the 401 error, keeping whatever reason the backend gave.
    pub fn session_expired(body: &str) -> Self {
        Self::SessionExpired {
            detail: detail_of(StatusCode::UNAUTHORIZED, body),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::SessionExpired { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Backend { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            Self::UrlParse(_) => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }
}

/// The `detail` field the backend attaches to its errors, or the raw body,
/// or the status reason when the body is empty.
fn detail_of(status: StatusCode, body: &str) -> String {
    let detail = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(detail)) => detail.clone(),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        _ => body.to_string(),
    };
    if detail.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        detail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_field_is_surfaced_verbatim() {
        let err = ApiError::backend(
            StatusCode::BAD_REQUEST,
            r#"{"detail":"Storage quota exceeded. Used: 4.99GB / 5.00GB"}"#,
        );
        match err {
            ApiError::Backend { status, detail } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(detail, "Storage quota exceeded. Used: 4.99GB / 5.00GB");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_structured_detail_is_kept_as_json() {
        let err = ApiError::backend(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":[{"loc":["body","email"],"msg":"field required"}]}"#,
        );
        let ApiError::Backend { detail, .. } = err else {
            panic!("expected backend error");
        };
        assert!(detail.contains("field required"));
    }

    #[test]
    fn test_plain_body_and_empty_body() {
        let ApiError::Backend { detail, .. } =
            ApiError::backend(StatusCode::BAD_GATEWAY, "upstream down")
        else {
            panic!("expected backend error");
        };
        assert_eq!(detail, "upstream down");

        let ApiError::Backend { detail, .. } =
            ApiError::backend(StatusCode::INTERNAL_SERVER_ERROR, "")
        else {
            panic!("expected backend error");
        };
        assert_eq!(detail, "Internal Server Error");
    }

    #[test]
    fn test_session_expired_reports_401() {
        let err = ApiError::session_expired(r#"{"detail":"Incorrect email or password"}"#);
        assert!(err.is_session_expired());
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(err.to_string(), "not authorized: Incorrect email or password");

        let ApiError::SessionExpired { detail } = ApiError::session_expired("") else {
            panic!("expected session expired");
        };
        assert_eq!(detail, "Unauthorized");
    }
}
