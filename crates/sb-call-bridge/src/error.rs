//! Error types for the call bridge.

use crate::domain::CorrelationCode;
use thiserror::Error;

/// Errors raised while dispatching or completing a bridged call.
///
/// Per-call errors (`Conversion`, `RemoteExecution`, `TimedOut`) are routed to
/// the call's own error continuation. The rest are returned synchronously from
/// the operation that hit them.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BridgeError {
    #[error("Unsupported result type: {0}")]
    UnsupportedResultType(String),

    #[error("Duplicate correlation code: {0}")]
    DuplicateCorrelation(CorrelationCode),

    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Remote execution of '{function}' failed: {message}")]
    RemoteExecution { function: String, message: String },

    #[error("Call to '{function}' timed out after {elapsed_ms}ms")]
    TimedOut { function: String, elapsed_ms: u64 },

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Argument mismatch for '{function}': {reason}")]
    ArgumentMismatch { function: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl BridgeError {
    /// Whether this error reached the call through the completion path
    /// (as opposed to being returned synchronously at dispatch time).
    pub fn is_completion_error(&self) -> bool {
        matches!(
            self,
            Self::Conversion(_) | Self::RemoteExecution { .. } | Self::TimedOut { .. }
        )
    }
}

/// Payload did not match the shape the host expected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("malformed payload for {target}: {reason}")]
    Malformed { target: String, reason: String },

    #[error("payload for {target} has the wrong shape: expected {expected}, found {found}")]
    ShapeMismatch {
        target: String,
        expected: String,
        found: String,
    },

    #[error("value could not be encoded: {0}")]
    Encode(String),
}
