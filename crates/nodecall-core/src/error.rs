use std::fmt;

use serde_json::Value;

/// Boxed source error carried by [`RpcError::Transport`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The request never produced an HTTP response (DNS, refused, timeout).
    #[error("connection error: {0}")]
    Transport(#[source] BoxError),

    /// The node answered with a 4xx/5xx status; the body was not interpreted.
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("RPC error: {0}")]
    Server(ServerError),

    #[error("invalid JSON-RPC response: {0}")]
    InvalidResponse(String),

    #[error("response id {actual} does not match request id {expected}")]
    IdMismatch { expected: u64, actual: Value },

    #[error("failed to encode JSON-RPC request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RpcError {
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }
}

// ==============================================================================
// Server Error Payload
// ==============================================================================

/// The `error` member of a JSON-RPC response, kept verbatim.
///
/// Bitcoin Core sends `{"code": <int>, "message": <string>}`, but the payload
/// is not required to have that shape, so the raw value is preserved and the
/// standard fields are exposed through accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerError {
    payload: Value,
}

impl ServerError {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }

    pub fn code(&self) -> Option<i64> {
        self.payload.get("code").and_then(Value::as_i64)
    }

    pub fn message(&self) -> Option<&str> {
        self.payload.get("message").and_then(Value::as_str)
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn into_payload(self) -> Value {
        self.payload
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code(), self.message()) {
            (Some(code), Some(message)) => write!(f, "{message} (code {code})"),
            _ => write!(f, "{}", self.payload),
        }
    }
}
