//! Collaborator interfaces consumed by the inspector.
//!
//! - [`LedgerNode`] - fetches raw transactions and resolves outpoints
//! - [`TransactionWithOutputs`] - a transaction that already carries the
//!   previous outputs its inputs spend

use crate::error::NodeError;
use crate::types::{Hash256, OutPoint, Transaction, TxInput, TxOutput};
use crate::utxo::Utxo;

/// A ledger node capable of looking up transactions and outputs.
///
/// Calls are blocking. Implementations own their timeout and cancellation
/// policy; callers never get a partial result.
pub trait LedgerNode: Send + Sync {
    /// Fetch a raw transaction by id.
    fn get_transaction(&self, txid: &Hash256) -> Result<Transaction, NodeError>;

    /// Resolve outpoints to output records.
    ///
    /// The result is aligned 1:1 and in order with `outpoints`.
    fn get_outputs(&self, outpoints: &[OutPoint]) -> Result<Vec<Utxo>, NodeError>;

    /// Persist a raw transaction.
    fn save_transaction(&self, tx: &Transaction) -> Result<(), NodeError>;
}

/// A transaction bundled with the outputs spent by its inputs.
pub trait TransactionWithOutputs {
    fn transaction(&self) -> &Transaction;

    fn input_count(&self) -> usize {
        self.transaction().inputs.len()
    }

    fn input(&self, index: usize) -> Option<&TxInput> {
        self.transaction().inputs.get(index)
    }

    /// The previous output spent by input `index`.
    fn input_output(&self, index: usize) -> Result<TxOutput, NodeError>;
}
