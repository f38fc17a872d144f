//! Construction paths.
//!
//! Every path funnels into [`InspectedTransaction::new_base_with_id`] and then
//! promotes. Paths differ only in where the spent outputs come from: the
//! ledger node, a builder, a transaction-with-outputs view, or an explicit
//! list.

use itx_core::address::Network;
use itx_core::builder::TxBuilder;
use itx_core::error::WireError;
use itx_core::traits::{LedgerNode, TransactionWithOutputs};
use itx_core::types::{Hash256, OutPoint, Transaction, TxOutput};
use itx_core::utxo::Utxo;
use itx_protocol::ProtocolCodec;

use crate::error::InspectorError;
use crate::transaction::{InspectedTransaction, State};

impl InspectedTransaction {
    /// Unpromoted record. Derived queries are invalid until
    /// [`promote`](Self::promote) or [`promote_from_utxos`](Self::promote_from_utxos).
    pub fn new_base(tx: Transaction) -> Result<Self, InspectorError> {
        let id = tx.txid();
        Self::new_base_with_id(id, tx)
    }

    /// Unpromoted record with an already computed id.
    pub fn new_base_with_id(id: Hash256, tx: Transaction) -> Result<Self, InspectorError> {
        if tx.inputs.is_empty() {
            return Err(InspectorError::MissingInputs);
        }
        if tx.outputs.is_empty() {
            return Err(InspectorError::MissingOutputs);
        }
        Ok(Self::from_parts(id, tx, State::default()))
    }

    /// Decode a hex-encoded raw transaction and resolve it through `node`.
    ///
    /// Surrounding whitespace is ignored.
    pub fn from_hex(
        raw: &str,
        node: &dyn LedgerNode,
        codec: &dyn ProtocolCodec,
        network: Network,
    ) -> Result<Self, InspectorError> {
        let bytes = hex::decode(raw.trim()).map_err(|e| WireError::InvalidHex(e.to_string()))?;
        let tx = Transaction::from_bytes(&bytes)?;
        Self::from_transaction(tx, node, codec, network)
    }

    /// Fetch the raw transaction from `node` and resolve it.
    pub fn from_txid(
        txid: &Hash256,
        node: &dyn LedgerNode,
        codec: &dyn ProtocolCodec,
        network: Network,
    ) -> Result<Self, InspectorError> {
        let tx = node.get_transaction(txid)?;
        let itx = Self::new_base_with_id(*txid, tx)?;
        itx.promote(node, codec, network)?;
        Ok(itx)
    }

    /// Resolve an already decoded transaction through `node`.
    pub fn from_transaction(
        tx: Transaction,
        node: &dyn LedgerNode,
        codec: &dyn ProtocolCodec,
        network: Network,
    ) -> Result<Self, InspectorError> {
        let itx = Self::new_base(tx)?;
        itx.promote(node, codec, network)?;
        Ok(itx)
    }

    /// Build from an assembled transaction. The builder already knows what
    /// each input spends, so no node is needed.
    pub fn from_builder(
        builder: &TxBuilder,
        codec: &dyn ProtocolCodec,
        network: Network,
    ) -> Result<Self, InspectorError> {
        let tx = builder.msg_tx();
        let utxos = tx
            .inputs
            .iter()
            .zip(builder.inputs())
            .filter(|(input, _)| !input.previous_output.is_coinbase())
            .map(|(input, spent)| utxo(input.previous_output, spent.value, &spent.locking_script))
            .collect::<Vec<_>>();

        let itx = Self::new_base(tx.clone())?;
        itx.promote_from_utxos(&utxos, codec, network)?;
        Ok(itx)
    }

    /// Build from a transaction that carries its spent outputs.
    pub fn from_transaction_with_outputs(
        view: &dyn TransactionWithOutputs,
        codec: &dyn ProtocolCodec,
        network: Network,
    ) -> Result<Self, InspectorError> {
        let itx = Self::new_base(view.transaction().clone())?;

        let mut utxos = Vec::with_capacity(view.input_count());
        for i in 0..view.input_count() {
            let output = view.input_output(i)?;
            let Some(input) = view.input(i) else {
                return Err(InspectorError::MissingInputs);
            };
            if input.previous_output.is_coinbase() {
                continue;
            }
            utxos.push(utxo(input.previous_output, output.value, &output.locking_script));
        }

        itx.promote_from_utxos(&utxos, codec, network)?;
        Ok(itx)
    }

    /// Build from the outputs spent by each input, given 1:1 with the inputs.
    pub fn from_outputs(
        id: Hash256,
        tx: Transaction,
        spent: &[TxOutput],
        codec: &dyn ProtocolCodec,
        network: Network,
    ) -> Result<Self, InspectorError> {
        let itx = Self::new_base_with_id(id, tx)?;
        if itx.tx().inputs.len() != spent.len() {
            return Err(InspectorError::MissingOutputs);
        }

        let utxos = itx
            .tx()
            .inputs
            .iter()
            .zip(spent)
            .filter(|(input, _)| !input.previous_output.is_coinbase())
            .map(|(input, output)| utxo(input.previous_output, output.value, &output.locking_script))
            .collect::<Vec<_>>();

        itx.promote_from_utxos(&utxos, codec, network)?;
        Ok(itx)
    }
}

fn utxo(outpoint: OutPoint, value: u64, locking_script: &itx_core::script::Script) -> Utxo {
    Utxo {
        txid: outpoint.txid,
        index: outpoint.index,
        value,
        locking_script: locking_script.clone(),
    }
}
