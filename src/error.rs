//! Client error type shared by the request wrapper, the resource accessors and
//! the session context.
//!
//! Every failure a command can hit ends up as one of these variants, so the
//! CLI only has to print `Display` to give the user an inline message.

use serde_json::Value;
use thiserror::Error;

/// Message used when a failed response carries no usable `message`/`error`.
pub const GENERIC_API_ERROR: &str = "API error";

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection, TLS or timeout failure before a response arrived
    #[error("Could not reach the server: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response from the backend
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// Input rejected locally before any request was made
    #[error("{0}")]
    Validation(String),

    /// Missing or unusable session (not logged in, not an admin, ...)
    #[error("{0}")]
    Session(String),

    /// A 2xx response that lacks something the caller needs
    #[error("Unexpected response from server: {0}")]
    UnexpectedResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Build the error for a failed response from its status and parsed body.
    ///
    /// The message prefers the body's `message`, then its `error` (a string,
    /// or an object carrying its own `message`), then [`GENERIC_API_ERROR`].
    pub fn from_response(status: u16, body: Option<Value>) -> Self {
        let message = body
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| GENERIC_API_ERROR.to_string());

        ClientError::Api {
            status,
            message,
            body,
        }
    }

    /// HTTP status of an API failure, `None` for every other kind
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_status(&self, code: u16) -> bool {
        self.status() == Some(code)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    pub fn session(message: impl Into<String>) -> Self {
        ClientError::Session(message.into())
    }
}

fn error_message(body: &Value) -> Option<String> {
    let non_empty = |v: &Value| {
        v.as_str()
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    };

    if let Some(message) = body.get("message").and_then(non_empty) {
        return Some(message);
    }

    match body.get("error") {
        Some(Value::Object(inner)) => inner.get("message").and_then(non_empty),
        Some(other) => non_empty(other),
        None => None,
    }
}
