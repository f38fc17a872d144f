//! Error types for ledger primitives.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("unexpected end of data: need {need} bytes, have {have}")] Truncated { need: usize, have: usize },
    #[error("length prefix {0} exceeds remaining data")] LengthOverflow(u64),
    #[error("{0} trailing bytes after transaction")] TrailingBytes(usize),
    #[error("truncated script push at offset {0}")] TruncatedPush(usize),
    #[error("invalid hex: {0}")] InvalidHex(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("locking script is not a recognized address template")] UnknownTemplate,
    #[error("invalid length: {0}")] InvalidLength(usize),
    #[error("unknown network: {0}")] UnknownNetwork(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    #[error("transaction not found: {0}")] NotFound(String),
    #[error("output not found: {0}")] OutputNotFound(String),
    #[error("node unavailable: {0}")] Unavailable(String),
    #[error("storage: {0}")] Storage(String),
}
