//! Action detection over locking scripts.
//!
//! A script that carries no recognizable envelope simply has no action.

use itx_core::address::Network;
use itx_core::script::Script;
use itx_core::types::Transaction;
use itx_protocol::{Action, ProtocolCodec};
use tracing::{debug, trace};

use crate::transaction::{ResolvedInput, ResolvedOutput};

/// Decode the action carried by `script`, if any.
pub fn detect(codec: &dyn ProtocolCodec, script: &Script, network: Network) -> Option<Action> {
    match codec.decode(script, network.is_test()) {
        Ok(action) => {
            debug!(code = action.code(), "detected action");
            Some(action)
        }
        Err(e) => {
            trace!(error = %e, "no action");
            None
        }
    }
}

/// Attach actions to resolved inputs in place.
pub fn detect_inputs(codec: &dyn ProtocolCodec, inputs: &mut [ResolvedInput], network: Network) {
    for input in inputs {
        input.action = detect(codec, &input.locking_script, network);
    }
}

/// One [`ResolvedOutput`] per raw output, in order.
pub fn parse_outputs(
    codec: &dyn ProtocolCodec,
    tx: &Transaction,
    network: Network,
) -> Vec<ResolvedOutput> {
    tx.outputs
        .iter()
        .map(|output| ResolvedOutput {
            action: detect(codec, &output.locking_script, network),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use itx_core::types::TxOutput;
    use itx_protocol::EnvelopeCodec;
    use itx_protocol::actions::Vote;

    #[test]
    fn detection_respects_network() {
        let codec = EnvelopeCodec::new();
        let script = codec.encode(&Action::from(Vote { timestamp: 3 }), true).unwrap();
        assert!(detect(&codec, &script, Network::Testnet).is_some());
        assert!(detect(&codec, &script, Network::Mainnet).is_none());
    }

    #[test]
    fn outputs_parallel_raw_outputs() {
        let codec = EnvelopeCodec::new();
        let tx = Transaction {
            version: 1,
            inputs: vec![],
            outputs: vec![
                TxOutput { value: 1, locking_script: Script::p2pkh(&[1; 20]) },
                TxOutput {
                    value: 0,
                    locking_script: codec.encode(&Action::from(Vote { timestamp: 9 }), false).unwrap(),
                },
            ],
            lock_time: 0,
        };
        let outputs = parse_outputs(&codec, &tx, Network::Mainnet);
        assert_eq!(outputs.len(), 2);
        assert!(outputs[0].action.is_none());
        assert_eq!(outputs[1].action, Some(Action::from(Vote { timestamp: 9 })));
    }

    #[test]
    fn empty_input_script_has_no_action() {
        let mut inputs = vec![ResolvedInput::default()];
        detect_inputs(&EnvelopeCodec::new(), &mut inputs, Network::Mainnet);
        assert!(inputs[0].action.is_none());
    }
}
