use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong between a form submission and a rendered response.
///
/// Features still show a single message per failure; the variants exist so the
/// cause is visible in the logs.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Local input was rejected before any request was built.
    #[error("{0}")]
    Validation(String),

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server returned {status} for {url}: {detail}")]
    Server {
        url: String,
        status: StatusCode,
        detail: String,
    },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request was cancelled")]
    Cancelled,
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => "validation",
            ClientError::Network { .. } => "network",
            ClientError::Server { .. } => "server",
            ClientError::Decode { .. } => "decode",
            ClientError::Io { .. } => "io",
            ClientError::InvalidUrl { .. } => "url",
            ClientError::Cancelled => "cancelled",
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_displayed_verbatim() {
        let err = ClientError::validation("Please enter a topic");
        assert_eq!(err.to_string(), "Please enter a topic");
        assert!(err.is_validation());
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_server_error_mentions_status() {
        let err = ClientError::Server {
            url: "http://localhost:8000/api/documents/".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: "boom".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("500"));
        assert!(text.contains("boom"));
        assert!(!err.is_validation());
    }
}
