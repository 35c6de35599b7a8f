//! Failure kinds of the cloud client.

/// Error type for cloud operations
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Server rejected request (error_code {code}): {message}")]
    ServerRejection { code: i64, message: String },

    #[error("Not logged in: call login before listing devices")]
    NotAuthenticated,

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl CloudError {
    /// Network, TLS, HTTP status or decoding failure.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::HttpStatus { .. } | Self::MalformedResponse(_)
        )
    }

    /// Well-formed response carrying a non-zero `error_code`.
    pub fn is_server_rejection(&self) -> bool {
        matches!(self, Self::ServerRejection { .. })
    }

    /// Server-supplied error code, when the server answered with one.
    pub fn error_code(&self) -> Option<i64> {
        match self {
            Self::ServerRejection { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
