use std::path::PathBuf;

use reqwest::StatusCode;

/// Errors returned by every [`Client`](crate::Client) operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or invalid client configuration, or an export request missing a
    /// field its format needs. Raised before any request is sent.
    #[error("configuration error: {0}")]
    Config(String),

    /// Request input the service would reject anyway. Raised before any request is sent.
    #[error("invalid input: {0}")]
    Input(String),

    /// The service answered with a non-2xx status.
    #[error("{message} (HTTP {status}{})", code_suffix(.code))]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Network-level failure from the HTTP transport.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// A successful response whose body did not match the expected shape.
    #[error("failed to parse API JSON (url={url})")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

fn code_suffix(code: &Option<String>) -> String {
    match code {
        Some(c) => format!(", code {c}"),
        None => String::new(),
    }
}

impl Error {
    /// HTTP status of a remote error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Service-defined error code of a remote error, e.g. `NO_CREDITS`.
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// True for 401/403 responses.
    pub fn is_auth(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

// Error bodies look like {"message": "...", "code": "..."}; some endpoints
// send {"error": "..."} instead.
#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) error: Option<String>,
    #[serde(default)]
    pub(crate) code: Option<String>,
}

/// Builds the [`Error::Api`] for a non-2xx response body.
///
/// A body that is not a JSON object decodes as an empty payload, so the
/// caller still gets the status and a generic message.
pub(crate) fn api_error(status: StatusCode, text: &str) -> Error {
    let body = serde_json::from_str::<ErrorBody>(text).unwrap_or_default();

    let message = body
        .message
        .or(body.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

    Error::Api {
        status: status.as_u16(),
        code: body.code,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_and_code_come_from_body() {
        let err = api_error(
            StatusCode::PAYMENT_REQUIRED,
            r#"{"message": "Insufficient credits", "code": "NO_CREDITS"}"#,
        );
        assert_eq!(err.status(), Some(402));
        assert_eq!(err.code(), Some("NO_CREDITS"));
        assert_eq!(err.to_string(), "Insufficient credits (HTTP 402, code NO_CREDITS)");
    }

    #[test]
    fn error_field_is_used_when_message_missing() {
        let err = api_error(StatusCode::BAD_REQUEST, r#"{"error": "bad country"}"#);
        match err {
            Error::Api { message, code, .. } => {
                assert_eq!(message, "bad country");
                assert!(code.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_json_body_falls_back_to_generic_message() {
        let err = api_error(StatusCode::BAD_GATEWAY, "<html>upstream down</html>");
        match err {
            Error::Api { status, code, message } => {
                assert_eq!(status, 502);
                assert!(code.is_none());
                assert_eq!(message, "Request failed with status 502");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_body_falls_back_to_generic_message() {
        let err = api_error(StatusCode::UNAUTHORIZED, "");
        assert!(err.is_auth());
        assert_eq!(err.to_string(), "Request failed with status 401 (HTTP 401)");
    }
}
