use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Raw text bodies are cut to this many characters in error messages.
const RAW_BODY_LIMIT: usize = 200;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Token exchange or token validation failed. The session must go back to unauthenticated.
    #[error("authentication failed: {message}")]
    Auth { status: Option<u16>, message: String },

    #[error("{service} returned {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: ErrorBody,
    },

    #[error("invalid response from {service}: {reason}")]
    Validation {
        service: &'static str,
        reason: String,
    },

    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("a playlist generation run is already in progress")]
    Busy,

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn auth(message: impl Into<String>) -> Self {
        Error::Auth {
            status: None,
            message: message.into(),
        }
    }

    pub fn validation(service: &'static str, reason: impl Into<String>) -> Self {
        Error::Validation {
            service,
            reason: reason.into(),
        }
    }

    pub fn transport(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Error::Transport { service, source }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth { .. })
    }

    /// A 401 from a bearer-authenticated API means the access token is no longer accepted.
    pub fn unauthorized_to_auth(self) -> Self {
        match self {
            Error::Upstream {
                service,
                status: 401,
                body,
            } => Error::Auth {
                status: Some(401),
                message: format!("{} rejected the access token: {}", service, body),
            },
            other => other,
        }
    }
}

/// Body of a failed response, parsed when the server said it was JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    Json {
        error: String,
        description: Option<String>,
    },
    Text(String),
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorBody::Json {
                error,
                description: Some(d),
            } => write!(f, "{} ({})", d, error),
            ErrorBody::Json {
                error,
                description: None,
            } => write!(f, "{}", error),
            ErrorBody::Text(raw) => write!(f, "non-JSON response: {}", raw),
        }
    }
}

// The accounts service answers {error, error_description}; the web API nests
// {error: {status, message}}.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonError {
    Flat {
        error: String,
        error_description: Option<String>,
    },
    Nested {
        error: NestedError,
    },
}

#[derive(Deserialize)]
struct NestedError {
    message: Option<String>,
    status: Option<u16>,
}

impl ErrorBody {
    /// Classify a failed response body. `content_type` decides whether a JSON parse is attempted.
    pub fn parse(content_type: Option<&str>, raw: &str) -> Self {
        let is_json = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);
        if is_json {
            match serde_json::from_str::<JsonError>(raw) {
                Ok(JsonError::Flat {
                    error,
                    error_description,
                }) => {
                    return ErrorBody::Json {
                        error,
                        description: error_description,
                    }
                }
                Ok(JsonError::Nested { error }) => {
                    let code = error
                        .status
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "error".into());
                    return ErrorBody::Json {
                        error: code,
                        description: error.message,
                    };
                }
                Err(_) => {}
            }
        }
        ErrorBody::Text(raw.chars().take(RAW_BODY_LIMIT).collect())
    }
}

/// Pass a successful response through; turn anything else into `Error::Upstream`.
pub async fn check_response(
    service: &'static str,
    resp: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let raw = resp.text().await.unwrap_or_default();
    let body = ErrorBody::parse(content_type.as_deref(), &raw);
    tracing::debug!(service, status = status.as_u16(), %body, "upstream call failed");
    Err(Error::Upstream {
        service,
        status: status.as_u16(),
        body,
    })
}
