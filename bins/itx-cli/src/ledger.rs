//! File-backed ledger node.
//!
//! The ledger is a JSON document holding raw transactions as hex. It is
//! loaded whole on open and rewritten on every save.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use itx_core::error::NodeError;
use itx_core::traits::LedgerNode;
use itx_core::types::{Hash256, OutPoint, Transaction};
use itx_core::utxo::Utxo;

#[derive(Serialize, Deserialize, Default)]
struct LedgerFile {
    transactions: Vec<String>,
}

pub struct FileLedger {
    path: PathBuf,
    txs: RwLock<HashMap<Hash256, Transaction>>,
}

impl FileLedger {
    /// Open the ledger at `path`. A missing file is an empty ledger.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, NodeError> {
        let path = path.into();
        let mut txs = HashMap::new();
        if path.exists() {
            let text = fs::read_to_string(&path).map_err(|e| storage(&path, e))?;
            let file: LedgerFile = serde_json::from_str(&text).map_err(|e| storage(&path, e))?;
            for raw in &file.transactions {
                let bytes = hex::decode(raw).map_err(|e| storage(&path, e))?;
                let tx = Transaction::from_bytes(&bytes).map_err(|e| storage(&path, e))?;
                txs.insert(tx.txid(), tx);
            }
        }
        debug!(path = %path.display(), transactions = txs.len(), "ledger opened");
        Ok(Self {
            path,
            txs: RwLock::new(txs),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.txs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.read().is_empty()
    }

    fn flush(&self, txs: &HashMap<Hash256, Transaction>) -> Result<(), NodeError> {
        let mut transactions: Vec<String> = txs.values().map(|tx| hex::encode(tx.to_bytes())).collect();
        transactions.sort();
        let text = serde_json::to_string_pretty(&LedgerFile { transactions })
            .map_err(|e| storage(&self.path, e))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| storage(&self.path, e))?;
        }
        fs::write(&self.path, text).map_err(|e| storage(&self.path, e))
    }
}

fn storage(path: &Path, e: impl std::fmt::Display) -> NodeError {
    NodeError::Storage(format!("{}: {e}", path.display()))
}

impl LedgerNode for FileLedger {
    fn get_transaction(&self, txid: &Hash256) -> Result<Transaction, NodeError> {
        self.txs
            .read()
            .get(txid)
            .cloned()
            .ok_or_else(|| NodeError::NotFound(txid.to_string()))
    }

    fn get_outputs(&self, outpoints: &[OutPoint]) -> Result<Vec<Utxo>, NodeError> {
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
        let mut txs = self.txs.write();
        let mut next = txs.clone();
        next.insert(tx.txid(), tx.clone());
        self.flush(&next)?;
        *txs = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itx_core::script::Script;
    use itx_core::types::{TxInput, TxOutput};

    fn funding(tag: u8) -> Transaction {
        Transaction {
            version: 1,
            inputs: vec![TxInput {
                previous_output: OutPoint::coinbase(),
                unlocking_script: Script::new(vec![tag]),
                sequence: u32::MAX,
            }],
            outputs: vec![
                TxOutput { value: 500, locking_script: Script::p2pkh(&[tag; 20]) },
                TxOutput { value: 700, locking_script: Script::p2pkh(&[tag; 20]) },
            ],
            lock_time: 0,
        }
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FileLedger::open(dir.path().join("ledger.json")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn saved_transactions_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.json");
        let tx = funding(1);
        let txid = tx.txid();
        {
            let ledger = FileLedger::open(&path).unwrap();
            ledger.save_transaction(&tx).unwrap();
            ledger.save_transaction(&funding(2)).unwrap();
        }
        let ledger = FileLedger::open(&path).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get_transaction(&txid).unwrap(), tx);
    }

    #[test]
    fn outputs_resolve_in_request_order() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FileLedger::open(dir.path().join("l.json")).unwrap();
        let tx = funding(3);
        let txid = tx.txid();
        ledger.save_transaction(&tx).unwrap();

        let utxos = ledger
            .get_outputs(&[OutPoint::new(txid, 1), OutPoint::new(txid, 0)])
            .unwrap();
        assert_eq!(utxos[0].value, 700);
        assert_eq!(utxos[1].value, 500);
        assert!(matches!(
            ledger.get_outputs(&[OutPoint::new(txid, 2)]),
            Err(NodeError::OutputNotFound(_))
        ));
        assert!(matches!(
            ledger.get_transaction(&Hash256([9; 32])),
            Err(NodeError::NotFound(_))
        ));
    }

    #[test]
    fn failed_save_leaves_ledger_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        // The ledger path is a directory, so every write fails.
        let path = dir.path().join("ledger.json");
        fs::create_dir(&path).unwrap();
        let ledger = FileLedger {
            path,
            txs: RwLock::new(HashMap::new()),
        };
        let tx = funding(4);
        assert!(matches!(ledger.save_transaction(&tx), Err(NodeError::Storage(_))));
        assert!(ledger.is_empty());
        assert!(matches!(
            ledger.get_transaction(&tx.txid()),
            Err(NodeError::NotFound(_))
        ));
    }

    #[test]
    fn corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, "{\"transactions\": [\"zz\"]}").unwrap();
        assert!(matches!(FileLedger::open(&path), Err(NodeError::Storage(_))));
    }
}
