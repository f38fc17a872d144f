//! A transaction shipped together with its ancestors.

use serde::{Deserialize, Serialize};

use crate::error::NodeError;
use crate::traits::TransactionWithOutputs;
use crate::types::{Hash256, Transaction, TxOutput};

/// A transaction plus the parent transactions whose outputs it spends.
///
/// Lets a receiver learn every spent output without querying a node.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ExpandedTransaction {
    pub tx: Transaction,
    pub ancestors: Vec<Transaction>,
}

impl ExpandedTransaction {
    pub fn new(tx: Transaction, ancestors: Vec<Transaction>) -> Self {
        Self { tx, ancestors }
    }

    pub fn ancestor(&self, txid: &Hash256) -> Option<&Transaction> {
        self.ancestors.iter().find(|a| a.txid() == *txid)
    }
}

impl TransactionWithOutputs for ExpandedTransaction {
    fn transaction(&self) -> &Transaction {
        &self.tx
    }

    fn input_output(&self, index: usize) -> Result<TxOutput, NodeError> {
        let input = self
            .tx
            .inputs
            .get(index)
            .ok_or_else(|| NodeError::OutputNotFound(format!("input {index}")))?;
        let outpoint = input.previous_output;
        if outpoint.is_coinbase() {
            // Coinbase inputs spend nothing.
            return Ok(TxOutput {
                value: 0,
                locking_script: Default::default(),
            });
        }
        let parent = self
            .ancestor(&outpoint.txid)
            .ok_or_else(|| NodeError::NotFound(outpoint.txid.to_string()))?;
        parent
            .outputs
            .get(outpoint.index as usize)
            .cloned()
            .ok_or_else(|| NodeError::OutputNotFound(outpoint.to_string()))
    }
}
