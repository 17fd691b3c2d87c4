//! Error types for Niri IPC operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when communicating with the niri compositor
#[derive(Debug, Error)]
pub enum NiriError {
    /// The NIRI_SOCKET environment variable is not set
    #[error("NIRI_SOCKET environment variable not set - is niri running?")]
    SocketNotSet,

    /// The socket path does not exist
    #[error("Niri socket not found at {path}")]
    SocketNotFound { path: PathBuf },

    /// Failed to connect to the niri socket
    #[error("Failed to connect to niri socket at {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to send request to niri
    #[error("Failed to send request to niri: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Failed to receive response from niri
    #[error("Failed to receive response from niri: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Failed to serialize request to JSON
    #[error("Failed to serialize request: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    /// A line from niri was not valid JSON of the expected shape
    #[error("Failed to deserialize response: {0}")]
    DeserializeFailed(#[source] serde_json::Error),

    /// A line from niri was not valid UTF-8
    #[error("Received a line that is not valid UTF-8: {0}")]
    InvalidUtf8(#[source] std::string::FromUtf8Error),

    /// A known notification carried a payload that doesn't fit its type
    #[error("Failed to decode {name} notification: {source}")]
    DecodeFailed {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// An action template did not form a valid niri action after binding
    #[error("Invalid parameters for action {name}: {source}")]
    InvalidAction {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Niri answered a request with a different response kind
    #[error("Unexpected response to {request} request")]
    UnexpectedResponse { request: &'static str },

    /// Niri returned an error response
    #[error("Niri returned error: {message}")]
    NiriError { message: String },

    /// Connection was closed unexpectedly
    #[error("Connection to niri closed unexpectedly")]
    ConnectionClosed,
}

impl NiriError {
    /// Whether the error only concerns a single incoming line
    ///
    /// The event stream skips such lines and keeps reading.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::DeserializeFailed(_) | Self::DecodeFailed { .. } | Self::InvalidUtf8(_)
        )
    }

    /// Whether the connection that produced this error can't be reused
    pub fn breaks_connection(&self) -> bool {
        matches!(
            self,
            Self::SendFailed(_)
                | Self::ReceiveFailed(_)
                | Self::DeserializeFailed(_)
                | Self::ConnectionClosed
        )
    }
}
