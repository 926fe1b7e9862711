//! API Errors

use thiserror::Error;

/// Failure of a request to the ORIA server
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, reset, timeout)
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with an `{error}` body
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// The server's error text
        message: String,
    },

    /// The server answered `"success": false` without error text
    #[error("request rejected ({status})")]
    Rejected {
        /// HTTP status code
        status: u16,
    },

    /// Non-success status without an error body
    #[error("unexpected status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The body was not the expected JSON shape
    #[error("invalid response: {0}")]
    Decode(String),

    /// The body parsed but lacked a field the client needs
    #[error("response missing field `{0}`")]
    MissingField(&'static str),
}

impl ApiError {
    /// Whether the request never produced a response
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// The server-provided error text, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_has_no_server_text() {
        let err = ApiError::Rejected { status: 200 };
        assert_eq!(err.server_message(), None);
        assert!(!err.is_transport());
        assert_eq!(err.to_string(), "request rejected (200)");
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
