//! Errors raised while talking to the backend or a third-party lookup.

use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid backend url: {message}")]
    Url { message: String },

    #[error("backend unreachable: {message}")]
    Network { message: String, timeout: bool },

    #[error("backend responded {status}: {message}")]
    Status {
        status: u16,
        message: String,
        details: Value,
    },

    #[error("unexpected backend payload: {message}")]
    Decode { message: String },
}

impl ApiError {
    /// HTTP status returned by the backend, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable message, suitable for showing next to a "try again"
    /// button.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Url { message }
            | ApiError::Network { message, .. }
            | ApiError::Status { message, .. }
            | ApiError::Decode { message } => message,
        }
    }

    /// Whether re-running the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network { .. } => true,
            ApiError::Status { status, .. } => *status >= 500 || *status == 429,
            ApiError::Url { .. } | ApiError::Decode { .. } => false,
        }
    }

    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        let details = serde_json::from_str::<Value>(body).unwrap_or(Value::Null);
        let message = describe(&details).unwrap_or_else(|| fallback_message(status, body));
        ApiError::Status {
            status,
            message,
            details,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode {
                message: err.to_string(),
            }
        } else {
            ApiError::Network {
                timeout: err.is_timeout(),
                message: err.to_string(),
            }
        }
    }
}

/// Reduces a backend error body to one sentence.
///
/// Looks at `detail`, `error`, `message` and `non_field_errors` first, then
/// falls back to the first field error as `"campo: mensagem"`.
pub fn describe(body: &Value) -> Option<String> {
    match body {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Array(items) => items.iter().find_map(describe),
        Value::Object(map) => {
            for key in ["detail", "error", "message", "non_field_errors"] {
                if let Some(found) = map.get(key).and_then(describe) {
                    return Some(found);
                }
            }
            map.iter()
                .find_map(|(field, value)| describe(value).map(|msg| format!("{field}: {msg}")))
        }
        _ => None,
    }
}

fn fallback_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() || body.starts_with('<') {
        format!("Erro {status} ao contactar o servidor")
    } else {
        body.chars().take(200).collect()
    }
}
