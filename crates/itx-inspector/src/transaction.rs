//! The inspected transaction record.
//!
//! An [`InspectedTransaction`] owns a raw transaction plus everything learned
//! about it: the value and locking script spent by each input, the actions
//! carried by inputs and outputs, and any rejection recorded by validation.
//!
//! Mutable state sits behind a single [`RwLock`]. Promotion takes the write
//! guard once; queries take short-lived read guards. Guards are released on
//! every exit path by drop.

use std::collections::HashSet;

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard, RwLockUpgradableReadGuard};
use serde::Serialize;
use tracing::{debug, warn};

use itx_core::address::Network;
use itx_core::script::Script;
use itx_core::traits::LedgerNode;
use itx_core::types::{Hash256, Transaction};
use itx_core::utxo::{Utxo, Utxos};
use itx_protocol::rejections::MSG_MALFORMED;
use itx_protocol::{Action, ProtocolCodec, codes};

use crate::detect;
use crate::error::{InspectorError, Mismatch};
use crate::resolve;

/// What an input spends. Empty for coinbase inputs.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedInput {
    pub value: u64,
    pub locking_script: Script,
    pub action: Option<Action>,
}

/// The action carried by an output, if any.
///
/// Value and locking script live in the raw transaction.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedOutput {
    pub action: Option<Action>,
}

/// A structurally invalid action recorded against the transaction.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    pub code: u8,
    pub text: String,
}

#[derive(Debug, Default)]
pub(crate) struct State {
    pub(crate) inputs: Vec<ResolvedInput>,
    pub(crate) outputs: Vec<ResolvedOutput>,
    pub(crate) rejection: Option<Rejection>,
    pub(crate) promoted: bool,
}

impl State {
    fn actions(&self) -> impl Iterator<Item = &Action> {
        self.inputs
            .iter()
            .filter_map(|i| i.action.as_ref())
            .chain(self.outputs.iter().filter_map(|o| o.action.as_ref()))
    }
}

/// A raw transaction enriched with resolved inputs and detected actions.
#[derive(Debug)]
pub struct InspectedTransaction {
    id: Hash256,
    tx: Transaction,
    pub(crate) state: RwLock<State>,
}

impl InspectedTransaction {
    pub(crate) fn from_parts(id: Hash256, tx: Transaction, state: State) -> Self {
        Self {
            id,
            tx,
            state: RwLock::new(state),
        }
    }

    pub fn id(&self) -> Hash256 {
        self.id
    }

    pub fn tx(&self) -> &Transaction {
        &self.tx
    }

    pub fn inputs(&self) -> MappedRwLockReadGuard<'_, [ResolvedInput]> {
        RwLockReadGuard::map(self.state.read(), |s| s.inputs.as_slice())
    }

    pub fn outputs(&self) -> MappedRwLockReadGuard<'_, [ResolvedOutput]> {
        RwLockReadGuard::map(self.state.read(), |s| s.outputs.as_slice())
    }

    pub fn input(&self, index: usize) -> Option<ResolvedInput> {
        self.state.read().inputs.get(index).cloned()
    }

    pub fn rejection(&self) -> Option<Rejection> {
        self.state.read().rejection.clone()
    }

    /// Detect actions on the current inputs and rebuild outputs.
    ///
    /// Does not resolve inputs and does not mark the record promoted.
    pub fn setup(&self, codec: &dyn ProtocolCodec, network: Network) {
        let mut state = self.state.write();
        detect::detect_inputs(codec, &mut state.inputs, network);
        state.outputs = detect::parse_outputs(codec, &self.tx, network);
    }

    /// Rebuild outputs from the raw transaction.
    pub fn parse_outputs(&self, codec: &dyn ProtocolCodec, network: Network) {
        let outputs = detect::parse_outputs(codec, &self.tx, network);
        self.state.write().outputs = outputs;
    }

    /// Resolve inputs through `node`, then detect actions.
    ///
    /// The node is queried before the write lock is taken.
    pub fn promote(
        &self,
        node: &dyn LedgerNode,
        codec: &dyn ProtocolCodec,
        network: Network,
    ) -> Result<(), InspectorError> {
        if self.is_promoted() {
            return Err(InspectorError::AlreadyPromoted);
        }
        let outpoints = resolve::spent_outpoints(&self.tx);
        let utxos = if outpoints.is_empty() {
            Vec::new()
        } else {
            node.get_outputs(&outpoints)?
        };
        self.promote_from_utxos(&utxos, codec, network)
    }

    /// Resolve inputs from records aligned with the non-coinbase inputs,
    /// then detect actions. Promotion happens at most once.
    pub fn promote_from_utxos(
        &self,
        utxos: &[Utxo],
        codec: &dyn ProtocolCodec,
        network: Network,
    ) -> Result<(), InspectorError> {
        let mut state = self.state.write();
        if state.promoted {
            return Err(InspectorError::AlreadyPromoted);
        }

        let mut inputs = resolve::resolve_inputs(&self.tx, utxos)?;
        detect::detect_inputs(codec, &mut inputs, network);
        state.inputs = inputs;
        state.outputs = detect::parse_outputs(codec, &self.tx, network);
        state.promoted = true;

        debug!(txid = %self.id, inputs = state.inputs.len(), "promoted");
        Ok(())
    }

    pub fn is_promoted(&self) -> bool {
        self.state.read().promoted
    }

    /// Structurally validate every action, inputs first.
    ///
    /// The first failure is recorded as a `MSG_MALFORMED` rejection and
    /// returned. Nothing is propagated as an error.
    pub fn validate(&self) -> Option<Rejection> {
        let state = self.state.upgradable_read();
        let failure = state.actions().find_map(|action| {
            action
                .validate()
                .err()
                .map(|e| (action.code(), e.to_string()))
        });
        let (code, text) = failure?;

        warn!(txid = %self.id, action = code, reason = %text, "protocol message is invalid");
        let rejection = Rejection {
            code: MSG_MALFORMED,
            text,
        };
        let mut state = RwLockUpgradableReadGuard::upgrade(state);
        state.rejection = Some(rejection.clone());
        Some(rejection)
    }

    /// Input value minus output value.
    ///
    /// Fails with `ValueOverflow` if the input total does not fit in a u64.
    pub fn fee(&self) -> Result<u64, InspectorError> {
        let state = self.state.read();
        self.fee_locked(&state)
    }

    fn fee_locked(&self, state: &State) -> Result<u64, InspectorError> {
        if state.inputs.len() != self.tx.inputs.len() {
            return Err(InspectorError::UnpromotedTx);
        }

        let mut total = 0u64;
        for input in &state.inputs {
            total = total
                .checked_add(input.value)
                .ok_or(InspectorError::ValueOverflow)?;
        }
        for output in &self.tx.outputs {
            total = total
                .checked_sub(output.value)
                .ok_or(InspectorError::NegativeFee)?;
        }
        Ok(total)
    }

    /// Fee per serialized byte of the raw transaction.
    pub fn fee_rate(&self) -> Result<f64, InspectorError> {
        let state = self.state.read();
        let fee = self.fee_locked(&state)?;
        let size = self.tx.serialized_size();
        if size == 0 {
            return Err(InspectorError::IncompleteTx);
        }
        Ok(fee as f64 / size as f64)
    }

    /// True if any input or output carries an action.
    pub fn is_tokenized(&self) -> bool {
        self.state.read().actions().next().is_some()
    }

    /// True if any action has a request code.
    pub fn is_request(&self) -> bool {
        self.state
            .read()
            .actions()
            .any(|a| codes::is_request_code(a.code()))
    }

    /// True if any action has a response code.
    pub fn is_response(&self) -> bool {
        self.state
            .read()
            .actions()
            .any(|a| codes::is_response_code(a.code()))
    }

    /// True if `locking_script` is spent by an input or locked by an output.
    pub fn is_relevant(&self, locking_script: &Script) -> bool {
        let state = self.state.read();
        state.inputs.iter().any(|i| &i.locking_script == locking_script)
            || self.tx.outputs.iter().any(|o| &o.locking_script == locking_script)
    }

    /// Distinct spendable locking scripts, inputs first, in first-seen order.
    pub fn locking_scripts(&self) -> Vec<Script> {
        let state = self.state.read();
        let mut seen = HashSet::new();
        state
            .inputs
            .iter()
            .map(|i| &i.locking_script)
            .chain(self.tx.outputs.iter().map(|o| &o.locking_script))
            .filter(|s| !s.is_unspendable())
            .filter(|s| seen.insert(*s))
            .cloned()
            .collect()
    }

    /// The outputs created by this transaction.
    pub fn utxos(&self) -> Utxos {
        self.tx
            .outputs
            .iter()
            .enumerate()
            .map(|(i, output)| Utxo::from_output(self.id, i as u32, output))
            .collect::<Vec<_>>()
            .into()
    }

    /// Previous transaction id of every raw input, coinbase included.
    pub fn input_txids(&self) -> Vec<Hash256> {
        self.tx.inputs.iter().map(|i| i.previous_output.txid).collect()
    }

    /// Field-by-field comparison. Actions compare by their encoded scripts.
    pub fn compare(&self, other: &Self, codec: &dyn ProtocolCodec) -> Result<(), Mismatch> {
        if self.id != other.id {
            return Err(Mismatch(format!("id: {} != {}", self.id, other.id)));
        }
        if self.tx != other.tx {
            return Err(Mismatch(format!(
                "tx bytes:\n  {}\n  {}",
                hex::encode(self.tx.to_bytes()),
                hex::encode(other.tx.to_bytes())
            )));
        }

        let left = self.state.read();
        let right = other.state.read_recursive();
        let left_code = left.rejection.as_ref().map(|r| r.code);
        let right_code = right.rejection.as_ref().map(|r| r.code);
        if left_code != right_code {
            return Err(Mismatch(format!("rejection code: {left_code:?} != {right_code:?}")));
        }

        if left.inputs.len() != right.inputs.len() {
            return Err(Mismatch(format!(
                "input count: {} != {}",
                left.inputs.len(),
                right.inputs.len()
            )));
        }
        for (i, (a, b)) in left.inputs.iter().zip(&right.inputs).enumerate() {
            if a.value != b.value {
                return Err(Mismatch(format!("input {i} value: {} != {}", a.value, b.value)));
            }
            if a.locking_script != b.locking_script {
                return Err(Mismatch(format!(
                    "input {i} locking script: {} != {}",
                    a.locking_script, b.locking_script
                )));
            }
            compare_actions(codec, &format!("input {i}"), &a.action, &b.action)?;
        }

        if left.outputs.len() != right.outputs.len() {
            return Err(Mismatch(format!(
                "output count: {} != {}",
                left.outputs.len(),
                right.outputs.len()
            )));
        }
        for (i, (a, b)) in left.outputs.iter().zip(&right.outputs).enumerate() {
            compare_actions(codec, &format!("output {i}"), &a.action, &b.action)?;
        }
        Ok(())
    }
}

fn compare_actions(
    codec: &dyn ProtocolCodec,
    what: &str,
    left: &Option<Action>,
    right: &Option<Action>,
) -> Result<(), Mismatch> {
    match (left, right) {
        (None, None) => Ok(()),
        (Some(_), None) => Err(Mismatch(format!("{what}: right missing action"))),
        (None, Some(_)) => Err(Mismatch(format!("{what}: left missing action"))),
        (Some(a), Some(b)) => {
            let encode = |action: &Action| {
                codec
                    .encode(action, true)
                    .map_err(|e| Mismatch(format!("{what}: encode action: {e}")))
            };
            let (a, b) = (encode(a)?, encode(b)?);
            if a != b {
                return Err(Mismatch(format!("{what} action: {a:?} != {b:?}")));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itx_core::types::{OutPoint, TxInput, TxOutput};
    use itx_protocol::EnvelopeCodec;
    use itx_protocol::actions::{ContractOffer, InstrumentCreation, Settlement, Transfer};

    fn p2pkh(n: u8) -> Script {
        Script::p2pkh(&[n; 20])
    }

    fn raw(inputs: &[OutPoint], outputs: Vec<TxOutput>) -> Transaction {
        Transaction {
            version: 1,
            inputs: inputs
                .iter()
                .map(|op| TxInput {
                    previous_output: *op,
                    unlocking_script: Script::default(),
                    sequence: u32::MAX,
                })
                .collect(),
            outputs,
            lock_time: 0,
        }
    }

    fn record(tx: Transaction) -> InspectedTransaction {
        InspectedTransaction::from_parts(tx.txid(), tx, State::default())
    }

    fn out(value: u64, locking_script: Script) -> TxOutput {
        TxOutput { value, locking_script }
    }

    fn funded(value: u64, outputs: Vec<TxOutput>) -> (InspectedTransaction, Vec<Utxo>) {
        let op = OutPoint::new(Hash256([1; 32]), 0);
        let itx = record(raw(&[op], outputs));
        let utxos = vec![Utxo { txid: op.txid, index: 0, value, locking_script: p2pkh(1) }];
        (itx, utxos)
    }

    #[test]
    fn fee_before_promotion_is_unpromoted() {
        let (itx, _) = funded(100, vec![out(50, p2pkh(2))]);
        assert_eq!(itx.fee(), Err(InspectorError::UnpromotedTx));
        assert_eq!(itx.fee_rate(), Err(InspectorError::UnpromotedTx));
        assert!(!itx.is_promoted());
    }

    #[test]
    fn fee_and_rate() {
        let codec = EnvelopeCodec::new();
        let (itx, utxos) = funded(100, vec![out(30, p2pkh(2)), out(20, p2pkh(3))]);
        itx.promote_from_utxos(&utxos, &codec, Network::Mainnet).unwrap();
        assert_eq!(itx.fee(), Ok(50));
        let rate = itx.fee_rate().unwrap();
        assert!((rate - 50.0 / itx.tx().serialized_size() as f64).abs() < 1e-12);
    }

    #[test]
    fn negative_fee() {
        let codec = EnvelopeCodec::new();
        let (itx, utxos) = funded(100, vec![out(60, p2pkh(2)), out(60, p2pkh(3))]);
        itx.promote_from_utxos(&utxos, &codec, Network::Mainnet).unwrap();
        assert_eq!(itx.fee(), Err(InspectorError::NegativeFee));
    }

    #[test]
    fn promotion_happens_once() {
        let codec = EnvelopeCodec::new();
        let (itx, utxos) = funded(100, vec![out(60, p2pkh(2))]);
        itx.promote_from_utxos(&utxos, &codec, Network::Mainnet).unwrap();
        assert_eq!(
            itx.promote_from_utxos(&utxos, &codec, Network::Mainnet),
            Err(InspectorError::AlreadyPromoted)
        );
        // The lock is free again after both calls.
        assert!(itx.is_promoted());
        assert!(itx.state.try_write().is_some());
    }

    #[test]
    fn failed_promotion_releases_lock() {
        let codec = EnvelopeCodec::new();
        let (itx, mut utxos) = funded(100, vec![out(60, p2pkh(2))]);
        utxos[0].index = 7;
        assert!(matches!(
            itx.promote_from_utxos(&utxos, &codec, Network::Mainnet),
            Err(InspectorError::MismatchedUtxo { .. })
        ));
        assert!(itx.state.try_write().is_some());
        assert!(!itx.is_promoted());
    }

    #[test]
    fn request_and_response_both_reported() {
        let codec = EnvelopeCodec::new();
        let request = codec.encode(&Action::from(Transfer::default()), false).unwrap();
        let response = codec.encode(&Action::from(Settlement::default()), false).unwrap();
        let (itx, utxos) = funded(100, vec![out(0, request), out(0, response)]);
        itx.promote_from_utxos(&utxos, &codec, Network::Mainnet).unwrap();
        assert!(itx.is_tokenized());
        assert!(itx.is_request());
        assert!(itx.is_response());
    }

    #[test]
    fn validate_records_first_failure() {
        let codec = EnvelopeCodec::new();
        let bad = codec.encode(&Action::from(ContractOffer::default()), false).unwrap();
        let (itx, utxos) = funded(100, vec![out(0, bad)]);
        itx.promote_from_utxos(&utxos, &codec, Network::Mainnet).unwrap();

        let rejection = itx.validate().unwrap();
        assert_eq!(rejection.code, MSG_MALFORMED);
        assert!(rejection.text.contains("contract_name"));
        assert_eq!(itx.rejection(), Some(rejection));
    }

    #[test]
    fn validate_checks_inputs_before_outputs() {
        let codec = EnvelopeCodec::new();
        let bad_input = codec.encode(&Action::from(InstrumentCreation::default()), false).unwrap();
        let bad_output = codec.encode(&Action::from(ContractOffer::default()), false).unwrap();
        let (itx, mut utxos) = funded(100, vec![out(0, bad_output)]);
        utxos[0].locking_script = bad_input;
        itx.promote_from_utxos(&utxos, &codec, Network::Mainnet).unwrap();
        assert!(itx.input(0).unwrap().action.is_some());

        let rejection = itx.validate().unwrap();
        assert_eq!(rejection.code, MSG_MALFORMED);
        assert!(rejection.text.contains("instrument_type"));
        assert!(!rejection.text.contains("contract_name"));
    }

    #[test]
    fn overflowing_input_total_is_an_error() {
        let codec = EnvelopeCodec::new();
        let ops = [OutPoint::new(Hash256([1; 32]), 0), OutPoint::new(Hash256([2; 32]), 0)];
        let itx = record(raw(&ops, vec![out(1, p2pkh(3))]));
        let utxos: Vec<Utxo> = ops
            .iter()
            .map(|op| Utxo { txid: op.txid, index: op.index, value: u64::MAX, locking_script: p2pkh(1) })
            .collect();
        itx.promote_from_utxos(&utxos, &codec, Network::Mainnet).unwrap();
        assert_eq!(itx.fee(), Err(InspectorError::ValueOverflow));
        assert_eq!(itx.fee_rate(), Err(InspectorError::ValueOverflow));
    }

    #[test]
    fn validate_without_actions_records_nothing() {
        let codec = EnvelopeCodec::new();
        let (itx, utxos) = funded(100, vec![out(10, p2pkh(2))]);
        itx.promote_from_utxos(&utxos, &codec, Network::Mainnet).unwrap();
        assert_eq!(itx.validate(), None);
        assert_eq!(itx.rejection(), None);
    }

    #[test]
    fn relevance_and_locking_scripts() {
        let codec = EnvelopeCodec::new();
        let data = Script::new(vec![0x00, 0x6a, 0x01, 0x01]);
        let (itx, utxos) = funded(
            100,
            vec![out(10, p2pkh(2)), out(10, p2pkh(1)), out(0, data.clone())],
        );
        itx.promote_from_utxos(&utxos, &codec, Network::Mainnet).unwrap();

        assert!(itx.is_relevant(&p2pkh(1)));
        assert!(itx.is_relevant(&p2pkh(2)));
        assert!(!itx.is_relevant(&p2pkh(9)));
        assert_eq!(itx.locking_scripts(), vec![p2pkh(1), p2pkh(2)]);
    }

    #[test]
    fn own_utxos_and_input_txids() {
        let (itx, _) = funded(100, vec![out(10, p2pkh(2)), out(20, p2pkh(2))]);
        let utxos = itx.utxos();
        assert_eq!(utxos.len(), 2);
        assert_eq!(utxos.value(), Some(30));
        assert_eq!(utxos.0[1].index, 1);
        assert_eq!(utxos.0[1].txid, itx.id());
        assert_eq!(utxos.for_locking_script(&p2pkh(2)).len(), 2);
        assert_eq!(itx.input_txids(), vec![Hash256([1; 32])]);
    }

    #[test]
    fn setup_does_not_promote() {
        let codec = EnvelopeCodec::new();
        let (itx, _) = funded(100, vec![out(10, p2pkh(2))]);
        itx.setup(&codec, Network::Mainnet);
        assert_eq!(itx.outputs().len(), 1);
        assert!(!itx.is_promoted());
    }

    #[test]
    fn compare_detects_differences() {
        let codec = EnvelopeCodec::new();
        let (a, utxos) = funded(100, vec![out(10, p2pkh(2))]);
        let (b, _) = funded(100, vec![out(10, p2pkh(2))]);
        a.promote_from_utxos(&utxos, &codec, Network::Mainnet).unwrap();
        b.promote_from_utxos(&utxos, &codec, Network::Mainnet).unwrap();
        assert_eq!(a.compare(&b, &codec), Ok(()));

        let (c, mut other) = funded(100, vec![out(10, p2pkh(2))]);
        other[0].value = 99;
        c.promote_from_utxos(&other, &codec, Network::Mainnet).unwrap();
        let err = a.compare(&c, &codec).unwrap_err();
        assert!(err.0.contains("input 0 value"));
    }
}
