//! Input resolution against unspent output records.
//!
//! Records are consumed strictly in input order, one per non-coinbase input.
//! Coinbase inputs resolve to an empty [`ResolvedInput`] and consume nothing.

use itx_core::types::{OutPoint, Transaction};
use itx_core::utxo::Utxo;
use tracing::debug;

use crate::error::InspectorError;
use crate::transaction::ResolvedInput;

/// Outpoints of every non-coinbase input, in order.
pub fn spent_outpoints(tx: &Transaction) -> Vec<OutPoint> {
    tx.inputs
        .iter()
        .map(|input| input.previous_output)
        .filter(|outpoint| !outpoint.is_coinbase())
        .collect()
}

/// Resolve every raw input of `tx` against `utxos`.
///
/// Actions are not attached here; see [`crate::detect::detect_inputs`].
pub fn resolve_inputs(tx: &Transaction, utxos: &[Utxo]) -> Result<Vec<ResolvedInput>, InspectorError> {
    let mut records = utxos.iter();
    let mut inputs = Vec::with_capacity(tx.inputs.len());

    for (i, input) in tx.inputs.iter().enumerate() {
        let outpoint = input.previous_output;
        if outpoint.is_coinbase() {
            inputs.push(ResolvedInput::default());
            continue;
        }

        let utxo = records.next().ok_or(InspectorError::MissingUtxo { input: i })?;
        if !utxo.matches(&outpoint) {
            return Err(InspectorError::MismatchedUtxo {
                input: i,
                expected: outpoint,
                got: utxo.outpoint(),
            });
        }

        inputs.push(ResolvedInput {
            value: utxo.value,
            locking_script: utxo.locking_script.clone(),
            action: None,
        });
    }

    let surplus = records.len();
    if surplus > 0 {
        debug!(surplus, "ignoring surplus utxo records");
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itx_core::script::Script;
    use itx_core::types::{Hash256, TxInput, TxOutput};

    fn input(outpoint: OutPoint) -> TxInput {
        TxInput {
            previous_output: outpoint,
            unlocking_script: Script::default(),
            sequence: u32::MAX,
        }
    }

    fn utxo(txid: u8, index: u32, value: u64) -> Utxo {
        Utxo {
            txid: Hash256([txid; 32]),
            index,
            value,
            locking_script: Script::p2pkh(&[txid; 20]),
        }
    }

    fn tx(outpoints: &[OutPoint]) -> Transaction {
        Transaction {
            version: 1,
            inputs: outpoints.iter().copied().map(input).collect(),
            outputs: vec![TxOutput { value: 1, locking_script: Script::p2pkh(&[0; 20]) }],
            lock_time: 0,
        }
    }

    #[test]
    fn resolves_in_order() {
        let t = tx(&[OutPoint::new(Hash256([1; 32]), 0), OutPoint::new(Hash256([2; 32]), 5)]);
        let inputs = resolve_inputs(&t, &[utxo(1, 0, 100), utxo(2, 5, 200)]).unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].value, 100);
        assert_eq!(inputs[1].value, 200);
        assert_eq!(inputs[1].locking_script, Script::p2pkh(&[2; 20]));
    }

    #[test]
    fn out_of_order_is_mismatch() {
        let t = tx(&[OutPoint::new(Hash256([1; 32]), 0), OutPoint::new(Hash256([2; 32]), 5)]);
        let err = resolve_inputs(&t, &[utxo(2, 5, 200), utxo(1, 0, 100)]).unwrap_err();
        assert!(matches!(err, InspectorError::MismatchedUtxo { input: 0, .. }));
    }

    #[test]
    fn wrong_index_is_mismatch() {
        let t = tx(&[OutPoint::new(Hash256([1; 32]), 0)]);
        let err = resolve_inputs(&t, &[utxo(1, 1, 100)]).unwrap_err();
        assert_eq!(
            err,
            InspectorError::MismatchedUtxo {
                input: 0,
                expected: OutPoint::new(Hash256([1; 32]), 0),
                got: OutPoint::new(Hash256([1; 32]), 1),
            }
        );
    }

    #[test]
    fn coinbase_consumes_nothing() {
        let t = tx(&[OutPoint::coinbase(), OutPoint::new(Hash256([3; 32]), 2)]);
        let inputs = resolve_inputs(&t, &[utxo(3, 2, 50)]).unwrap();
        assert_eq!(inputs[0], ResolvedInput::default());
        assert_eq!(inputs[1].value, 50);
        assert_eq!(spent_outpoints(&t), vec![OutPoint::new(Hash256([3; 32]), 2)]);
    }

    #[test]
    fn too_few_records() {
        let t = tx(&[OutPoint::new(Hash256([1; 32]), 0), OutPoint::new(Hash256([2; 32]), 0)]);
        let err = resolve_inputs(&t, &[utxo(1, 0, 100)]).unwrap_err();
        assert_eq!(err, InspectorError::MissingUtxo { input: 1 });
    }

    #[test]
    fn surplus_records_ignored() {
        let t = tx(&[OutPoint::new(Hash256([1; 32]), 0)]);
        let inputs = resolve_inputs(&t, &[utxo(1, 0, 100), utxo(9, 9, 9)]).unwrap();
        assert_eq!(inputs.len(), 1);
    }
}
