use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Host reported error {code} for `{method}`: {message}")]
    PlatformError {
        method: String,
        code: String,
        message: String,
    },
    #[error("Unexpected response to `{method}`: {reason}")]
    UnexpectedResponse { method: String, reason: String },
    #[error("Protocol error: {0}")]
    ProtocolError(String),
    #[error("Host closed the channel")]
    HostClosed,
    #[error("Unknown method `{0}`")]
    UnknownMethod(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
