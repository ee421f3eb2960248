use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Connection error ({endpoint}): {message}")]
    Connectivity { endpoint: String, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("RPC error: {message}")]
    Rpc { message: String, code: Option<i64> },

    #[error("Invalid response: {0}")]
    MalformedResponse(String),

    #[error("Worker failed: {0}")]
    Worker(String),
}

impl RelayError {
    pub fn connectivity(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        RelayError::Connectivity {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Only connectivity failures are worth another attempt against a different node.
    /// A server that answered with an error envelope is authoritative.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RelayError::Connectivity { .. })
    }

    /// Protocol errors reported by a server; never suppressed.
    pub fn is_rpc(&self) -> bool {
        matches!(self, RelayError::Rpc { .. })
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
