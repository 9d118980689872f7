//! Error types for the request pipeline, token storage, and session store.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Fallback shown when a login attempt fails without a backend explanation.
pub const GENERIC_LOGIN_FAILURE: &str = "Login failed";

/// Convenience alias for pipeline results.
pub type ClientResult<T> = Result<T, ClientError>;

/// Failures surfaced by [`crate::api::ApiClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// An authenticated call was attempted with no bearer token attached.
    #[error("not signed in: no session token is attached")]
    NotAuthenticated,
    /// The backend rejected the attached token with `401 Unauthorized`.
    #[error("session expired; sign in again")]
    SessionExpired,
    /// The request did not complete within the configured deadline.
    #[error("request to {path} timed out")]
    Timeout {
        /// API path that timed out.
        path: String,
    },
    /// The request could not be delivered or the response could not be read.
    #[error("request to {path} failed: {source}")]
    Transport {
        /// API path that failed.
        path: String,
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },
    /// The backend answered with a non-success status or `success: false`.
    #[error("{}", describe_api_failure(.status, .message))]
    Api {
        /// HTTP status of the response.
        status: StatusCode,
        /// Backend-provided explanation; empty when the backend gave none.
        message: String,
    },
    /// The response body did not match the expected shape.
    #[error("unexpected response from {path}: {message}")]
    Decode {
        /// API path whose response was malformed.
        path: String,
        /// Parser diagnostic.
        message: String,
    },
    /// The backend reported success but omitted the payload.
    #[error("response from {path} carried no data")]
    MissingData {
        /// API path whose payload was missing.
        path: String,
    },
    /// The configured base URL and the path do not form a valid URL.
    #[error("invalid endpoint {0}")]
    InvalidUrl(String),
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

impl ClientError {
    /// HTTP status attached to the failure, if the backend answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::SessionExpired => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    /// Message suitable for end users; transport details are not included.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { status, message } if message.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::Timeout { .. } => "The server took too long to respond".to_string(),
            Self::Transport { .. } => "Unable to connect to server".to_string(),
            Self::NotAuthenticated | Self::SessionExpired => {
                "Your session has ended; please sign in again".to_string()
            }
            other => other.to_string(),
        }
    }
}

fn describe_api_failure(status: &StatusCode, message: &str) -> String {
    if message.trim().is_empty() {
        format!("request failed ({status})")
    } else {
        format!("{message} ({status})")
    }
}

/// Failures reading or writing the persisted bearer token.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem access failed.
    #[error("token storage at {} failed: {source}", .path.display())]
    Io {
        /// Token file location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// No platform configuration directory could be determined.
    #[error("no configuration directory available for token storage")]
    NoConfigDir,
}

/// Failures surfaced by [`crate::session::SessionStore::login`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backend (or the network) refused the login; carries a user-facing message.
    #[error("{message}")]
    Rejected {
        /// User-facing explanation.
        message: String,
        /// Pipeline failure behind the rejection, when there was one.
        #[source]
        source: Option<ClientError>,
    },
    /// The token was issued but could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionError {
    pub(crate) fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
            source: None,
        }
    }

    /// Message suitable for end users.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            Self::Storage(err) => err.to_string(),
        }
    }
}

impl From<ClientError> for SessionError {
    fn from(err: ClientError) -> Self {
        let message = match &err {
            ClientError::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            ClientError::Api { .. } => GENERIC_LOGIN_FAILURE.to_string(),
            other => other.user_message(),
        };
        Self::Rejected {
            message,
            source: Some(err),
        }
    }
}
