//! Error types for the action protocol.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("script does not carry a protocol envelope")] NotRecognized,
    #[error("unsupported envelope version: {0}")] UnsupportedVersion(u8),
    #[error("unknown action code: {0}")] UnknownCode(String),
    #[error("payload: {0}")] Payload(String),
}

/// A structural problem with an action's fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} too long: {len} > {max}")]
    TooLong { field: &'static str, len: usize, max: usize },
    #[error("{field} must be {expected} bytes, got {got}")]
    WrongSize { field: &'static str, expected: usize, got: usize },
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
