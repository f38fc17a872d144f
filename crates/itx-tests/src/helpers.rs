//! Shared test helpers for integration tests.

use std::collections::HashMap;

use parking_lot::RwLock;

use itx_core::error::NodeError;
use itx_core::script::Script;
use itx_core::traits::LedgerNode;
use itx_core::types::{Hash256, OutPoint, Transaction, TxInput, TxOutput};
use itx_core::utxo::Utxo;
use itx_protocol::{Action, EnvelopeCodec, ProtocolCodec};

/// P2PKH locking script for a seed byte.
pub fn p2pkh(seed: u8) -> Script {
    Script::p2pkh(&[seed; 20])
}

/// A 20-byte instrument code from a seed byte.
pub fn instrument_code(seed: u8) -> Vec<u8> {
    vec![seed; 20]
}

/// Envelope script carrying `action`.
pub fn action_script(action: impl Into<Action>, is_test: bool) -> Script {
    EnvelopeCodec::new()
        .encode(&action.into(), is_test)
        .expect("encode action")
}

/// Coinbase transaction paying `value` to `locking_script`.
///
/// `tag` lands in the unlocking script so distinct tags give distinct txids.
pub fn make_coinbase(value: u64, locking_script: Script, tag: u32) -> Transaction {
    Transaction {
        version: 1,
        inputs: vec![TxInput {
            previous_output: OutPoint::coinbase(),
            unlocking_script: Script::new(tag.to_le_bytes().to_vec()),
            sequence: u32::MAX,
        }],
        outputs: vec![TxOutput {
            value,
            locking_script,
        }],
        lock_time: 0,
    }
}

/// Unsigned spending transaction.
pub fn make_tx(inputs: Vec<OutPoint>, outputs: Vec<(u64, Script)>) -> Transaction {
    Transaction {
        version: 1,
        inputs: inputs
            .into_iter()
            .map(|previous_output| TxInput {
                previous_output,
                unlocking_script: Script::new(vec![0x51]),
                sequence: u32::MAX,
            })
            .collect(),
        outputs: outputs
            .into_iter()
            .map(|(value, locking_script)| TxOutput {
                value,
                locking_script,
            })
            .collect(),
        lock_time: 0,
    }
}

/// Ledger node over an in-memory transaction map.
///
/// Counts `get_outputs` calls and can be switched offline.
#[derive(Default)]
pub struct MockNode {
    txs: RwLock<HashMap<Hash256, Transaction>>,
    offline: RwLock<bool>,
    output_calls: RwLock<usize>,
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `tx` and return its id.
    pub fn insert(&self, tx: Transaction) -> Hash256 {
        let txid = tx.txid();
        self.txs.write().insert(txid, tx);
        txid
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.write() = offline;
    }

    pub fn output_calls(&self) -> usize {
        *self.output_calls.read()
    }

    fn check_online(&self) -> Result<(), NodeError> {
        if *self.offline.read() {
            return Err(NodeError::Unavailable("mock node offline".into()));
        }
        Ok(())
    }
}

impl LedgerNode for MockNode {
    fn get_transaction(&self, txid: &Hash256) -> Result<Transaction, NodeError> {
        self.check_online()?;
        self.txs
            .read()
            .get(txid)
            .cloned()
            .ok_or_else(|| NodeError::NotFound(txid.to_string()))
    }

    fn get_outputs(&self, outpoints: &[OutPoint]) -> Result<Vec<Utxo>, NodeError> {
        self.check_online()?;
        *self.output_calls.write() += 1;
        let txs = self.txs.read();
        outpoints
            .iter()
            .map(|op| {
                let tx = txs
                    .get(&op.txid)
                    .ok_or_else(|| NodeError::NotFound(op.txid.to_string()))?;
                tx.outputs
                    .get(op.index as usize)
                    .map(|out| Utxo::from_output(op.txid, op.index, out))
                    .ok_or_else(|| NodeError::OutputNotFound(op.to_string()))
            })
            .collect()
    }

    fn save_transaction(&self, tx: &Transaction) -> Result<(), NodeError> {
        self.check_online()?;
        self.insert(tx.clone());
        Ok(())
    }
}
