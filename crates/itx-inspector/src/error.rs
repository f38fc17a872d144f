//! Error types for inspected transactions.
use itx_core::error::{NodeError, WireError};
use itx_core::types::OutPoint;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InspectorError {
    #[error("failed to decode: {0}")]
    Decode(#[from] WireError),
    #[error("transaction is missing inputs")]
    MissingInputs,
    #[error("transaction is missing outputs")]
    MissingOutputs,
    #[error("mismatched utxo for input {input}: expected {expected}, got {got}")]
    MismatchedUtxo {
        input: usize,
        expected: OutPoint,
        got: OutPoint,
    },
    #[error("no utxo supplied for input {input}")]
    MissingUtxo { input: usize },
    #[error("negative fee")]
    NegativeFee,
    #[error("input value total overflows")]
    ValueOverflow,
    #[error("unpromoted tx")]
    UnpromotedTx,
    #[error("incomplete tx")]
    IncompleteTx,
    #[error("unknown version: {0}")]
    UnknownVersion(u8),
    #[error("transaction is already promoted")]
    AlreadyPromoted,
    #[error("node: {0}")]
    Node(#[from] NodeError),
}

/// A field that differs between two records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct Mismatch(pub String);
