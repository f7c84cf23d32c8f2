use healthtrends_core::CoreError;
use reqwest::StatusCode;

/// How a failure is presented to the user. Only the HTTP status is inspected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// 403: the user's role does not allow the operation.
    PermissionDenied,
    /// 409: the backend wants a forced retry.
    Conflict,
    /// No usable session; the caller should route to the entry screen.
    NoSession,
    Other,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("no valid session")]
    NoSession,
    #[error("session expired")]
    SessionExpired,
    #[error("server answered {status}: {detail}")]
    Api { status: StatusCode, detail: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("identity provider: {0}")]
    Identity(String),
    #[error("no app client id configured for login")]
    MissingAppClientId,
    #[error("failed to read session file: {0}")]
    SessionRead(std::io::Error),
    #[error("failed to write session file: {0}")]
    SessionWrite(std::io::Error),
    #[error("session file is corrupt: {0}")]
    SessionFormat(serde_json::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ClientError {
    /// Build an API error from a non-success response body.
    ///
    /// Backend errors carry `{"detail": ...}`; anything else is shown verbatim.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| match v.get("detail").or_else(|| v.get("message")) {
                Some(serde_json::Value::String(s)) => Some(s.clone()),
                Some(other) => Some(other.to_string()),
                None => None,
            })
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("no details")
                        .to_string()
                } else {
                    trimmed.to_string()
                }
            });

        ClientError::Api { status, detail }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            ClientError::Api { status, .. } if *status == StatusCode::FORBIDDEN => {
                ErrorClass::PermissionDenied
            }
            ClientError::Api { status, .. } if *status == StatusCode::CONFLICT => {
                ErrorClass::Conflict
            }
            ClientError::NoSession | ClientError::SessionExpired => ErrorClass::NoSession,
            _ => ErrorClass::Other,
        }
    }

    /// Backend-provided detail text, if this is an API error.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Api { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// One-line status message for the user.
    pub fn status_line(&self) -> String {
        match self.class() {
            ErrorClass::PermissionDenied => "Error: you do not have permission to do that.".into(),
            ErrorClass::Conflict => format!("Conflict: {}", self.detail().unwrap_or("")),
            ErrorClass::NoSession => "No active session: log in to continue.".into(),
            ErrorClass::Other => match self {
                ClientError::Api { detail, .. } => format!("Error: {detail}"),
                other => format!("Error: {other}"),
            },
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_status() {
        let forbidden = ClientError::from_response(StatusCode::FORBIDDEN, r#"{"detail":"Solo Admins."}"#);
        assert_eq!(forbidden.class(), ErrorClass::PermissionDenied);
        assert_eq!(
            forbidden.status_line(),
            "Error: you do not have permission to do that."
        );

        let conflict = ClientError::from_response(
            StatusCode::CONFLICT,
            r#"{"detail":"3 results use this test"}"#,
        );
        assert_eq!(conflict.class(), ErrorClass::Conflict);
        assert_eq!(conflict.status_line(), "Conflict: 3 results use this test");

        let other = ClientError::from_response(StatusCode::NOT_FOUND, r#"{"detail":"not found"}"#);
        assert_eq!(other.class(), ErrorClass::Other);
        assert_eq!(other.status_line(), "Error: not found");
    }

    #[test]
    fn non_json_bodies_are_kept() {
        let err = ClientError::from_response(StatusCode::BAD_GATEWAY, "upstream timed out\n");
        assert_eq!(err.detail(), Some("upstream timed out"));

        let empty = ClientError::from_response(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(empty.detail(), Some("Internal Server Error"));
    }

    #[test]
    fn structured_detail_is_stringified() {
        let err = ClientError::from_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":[{"loc":["body","value"]}]}"#,
        );
        assert!(err.detail().unwrap().contains("value"));
    }

    #[test]
    fn encode_failures_are_not_reported_as_decode() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ClientError::Encode(source);
        assert_eq!(err.class(), ErrorClass::Other);
        assert!(err
            .status_line()
            .starts_with("Error: failed to encode request body"));
    }

    #[test]
    fn missing_session_routes_to_entry() {
        assert_eq!(ClientError::NoSession.class(), ErrorClass::NoSession);
        assert_eq!(
            ClientError::NoSession.status_line(),
            "No active session: log in to continue."
        );
    }
}
