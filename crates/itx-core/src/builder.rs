//! Transaction assembly that remembers what each input spends.
//!
//! Signing is not handled here; unlocking scripts are supplied by the caller
//! or left empty.

use crate::constants::{DEFAULT_SEQUENCE, DEFAULT_TX_VERSION};
use crate::script::Script;
use crate::types::{OutPoint, Transaction, TxInput, TxOutput};
use crate::utxo::Utxo;

/// Value and locking script of the output an input spends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSupplement {
    pub value: u64,
    pub locking_script: Script,
}

/// Builder for a transaction and the previous outputs of its inputs.
///
/// # Example
/// ```
/// use itx_core::builder::TxBuilder;
/// use itx_core::script::Script;
/// use itx_core::types::Hash256;
/// use itx_core::utxo::Utxo;
///
/// let mut b = TxBuilder::new();
/// b.add_input_utxo(&Utxo {
///     txid: Hash256([1; 32]),
///     index: 0,
///     value: 10_000,
///     locking_script: Script::p2pkh(&[2; 20]),
/// });
/// b.add_output(Script::p2pkh(&[3; 20]), 9_000);
/// assert_eq!(b.msg_tx().inputs.len(), 1);
/// assert_eq!(b.inputs()[0].value, 10_000);
/// ```
#[derive(Debug, Clone)]
pub struct TxBuilder {
    tx: Transaction,
    inputs: Vec<InputSupplement>,
}

impl TxBuilder {
    pub fn new() -> Self {
        Self {
            tx: Transaction {
                version: DEFAULT_TX_VERSION,
                inputs: Vec::new(),
                outputs: Vec::new(),
                lock_time: 0,
            },
            inputs: Vec::new(),
        }
    }

    pub fn set_version(&mut self, version: i32) -> &mut Self {
        self.tx.version = version;
        self
    }

    pub fn set_lock_time(&mut self, lock_time: u32) -> &mut Self {
        self.tx.lock_time = lock_time;
        self
    }

    /// Spend `utxo` with an empty unlocking script.
    pub fn add_input_utxo(&mut self, utxo: &Utxo) -> &mut Self {
        self.tx.inputs.push(TxInput {
            previous_output: utxo.outpoint(),
            unlocking_script: Script::default(),
            sequence: DEFAULT_SEQUENCE,
        });
        self.inputs.push(InputSupplement {
            value: utxo.value,
            locking_script: utxo.locking_script.clone(),
        });
        self
    }

    /// Add a coinbase input carrying arbitrary `data` as its unlocking script.
    pub fn add_coinbase_input(&mut self, data: Vec<u8>) -> &mut Self {
        self.tx.inputs.push(TxInput {
            previous_output: OutPoint::coinbase(),
            unlocking_script: Script(data),
            sequence: DEFAULT_SEQUENCE,
        });
        self.inputs.push(InputSupplement::default());
        self
    }

    pub fn add_output(&mut self, locking_script: Script, value: u64) -> &mut Self {
        self.tx.outputs.push(TxOutput {
            value,
            locking_script,
        });
        self
    }

    /// Replace the unlocking script of input `index`. Returns false if out of range.
    pub fn set_unlocking_script(&mut self, index: usize, script: Script) -> bool {
        match self.tx.inputs.get_mut(index) {
            Some(input) => {
                input.unlocking_script = script;
                true
            }
            None => false,
        }
    }

    /// The transaction under construction.
    pub fn msg_tx(&self) -> &Transaction {
        &self.tx
    }

    /// Previous output details, parallel to `msg_tx().inputs`.
    pub fn inputs(&self) -> &[InputSupplement] {
        &self.inputs
    }

    /// Sum of spent values minus sum of output values, if non-negative.
    pub fn estimated_fee(&self) -> Option<u64> {
        let spent = self
            .inputs
            .iter()
            .try_fold(0u64, |acc, i| acc.checked_add(i.value))?;
        spent.checked_sub(self.tx.total_output_value()?)
    }
}

impl Default for TxBuilder {
    fn default() -> Self {
        Self::new()
    }
}
