//! Human-readable dump of an inspected transaction.

use std::fmt::Write;

use chrono::DateTime;
use itx_core::address::{Address, Network};
use itx_core::constants::COIN;
use itx_core::script::Script;
use itx_protocol::Action;
use itx_protocol::rejections::reject_code_label;

use crate::transaction::InspectedTransaction;

fn address_line(out: &mut String, script: &Script, network: Network) {
    if script.is_unspendable() {
        return;
    }
    if let Ok(address) = Address::from_locking_script(script, network) {
        let _ = writeln!(out, "    Address: {address}");
    }
}

fn action_lines(out: &mut String, action: Option<&Action>) {
    let Some(action) = action else {
        out.push('\n');
        return;
    };
    match serde_json::to_string_pretty(action) {
        Ok(json) => {
            let json = json.replace('\n', "\n      ");
            let _ = writeln!(out, "    Action: {} ({})\n      {json}", action.name(), action.code());
        }
        Err(_) => {
            let _ = writeln!(out, "    Action: {} ({})", action.name(), action.code());
        }
    }
}

impl InspectedTransaction {
    /// Multi-line description of the transaction, its resolved inputs and
    /// its outputs. Addresses are rendered for `network`.
    pub fn render(&self, network: Network) -> String {
        let tx = self.tx();
        let state = self.state.read();
        let mut out = String::new();

        let _ = writeln!(out, "TxId: {} ({} bytes)", self.id(), tx.serialized_size());
        let _ = writeln!(out, "  Version: {}", tx.version);

        out.push_str("  Inputs:\n\n");
        for (i, input) in tx.inputs.iter().enumerate() {
            let _ = writeln!(out, "    Outpoint: {}", input.previous_output);
            let _ = writeln!(out, "    UnlockingScript: {}", input.unlocking_script);
            let _ = writeln!(out, "    Sequence: {:x}", input.sequence);
            let Some(resolved) = state.inputs.get(i) else {
                out.push_str("    (unresolved)\n\n");
                continue;
            };
            let _ = writeln!(out, "    LockingScript: {}", resolved.locking_script);
            address_line(&mut out, &resolved.locking_script, network);
            let _ = writeln!(out, "    Value: {}", resolved.value);
            action_lines(&mut out, resolved.action.as_ref());
        }

        out.push_str("  Outputs:\n\n");
        for (i, output) in tx.outputs.iter().enumerate() {
            let _ = writeln!(out, "    Value: {:.8}", output.value as f64 / COIN as f64);
            let _ = writeln!(out, "    LockingScript: {}", output.locking_script);
            address_line(&mut out, &output.locking_script, network);
            action_lines(&mut out, state.outputs.get(i).and_then(|o| o.action.as_ref()));
        }

        let _ = writeln!(out, "  LockTime: {}", tx.lock_time);
        drop(state);

        if let Some(ts) = self.reordering_timestamp() {
            let at = DateTime::from_timestamp_nanos(ts.min(i64::MAX as u64) as i64);
            let _ = writeln!(out, "  Timestamp: {}", at.to_rfc3339());
        }
        if let Some(rejection) = self.rejection() {
            let _ = writeln!(
                out,
                "  Rejected: {} ({}) {}",
                reject_code_label(rejection.code),
                rejection.code,
                rejection.text
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itx_core::types::{Hash256, OutPoint, Transaction, TxInput, TxOutput};
    use itx_core::utxo::Utxo;
    use itx_protocol::actions::Settlement;
    use itx_protocol::{EnvelopeCodec, ProtocolCodec};

    #[test]
    fn renders_inputs_outputs_and_actions() {
        let codec = EnvelopeCodec::new();
        let prev = Hash256([1; 32]);
        let settlement = Action::from(Settlement { instruments: vec![], timestamp: 1_600_000_000_000_000_000 });
        let tx = Transaction {
            version: 1,
            inputs: vec![TxInput {
                previous_output: OutPoint::new(prev, 0),
                unlocking_script: Script::default(),
                sequence: 0xffff_ffff,
            }],
            outputs: vec![
                TxOutput { value: 150_000_000, locking_script: Script::p2pkh(&[0; 20]) },
                TxOutput { value: 0, locking_script: codec.encode(&settlement, false).unwrap() },
            ],
            lock_time: 7,
        };
        let itx = InspectedTransaction::new_base(tx).unwrap();
        let utxos = [Utxo { txid: prev, index: 0, value: 200_000_000, locking_script: Script::p2pkh(&[0; 20]) }];
        itx.promote_from_utxos(&utxos, &codec, Network::Mainnet).unwrap();

        let text = itx.render(Network::Mainnet);
        assert!(text.starts_with(&format!("TxId: {}", itx.id())));
        assert!(text.contains("Sequence: ffffffff"));
        assert!(text.contains("Value: 200000000"));
        assert!(text.contains("Value: 1.50000000"));
        assert!(text.contains("Address: 1111111111111111111114oLvT2"));
        assert!(text.contains("Action: Settlement (T2)"));
        assert!(text.contains("\"timestamp\": 1600000000000000000"));
        assert!(text.contains("Timestamp: 2020-09-13T12:26:40+00:00"));
        assert!(text.contains("LockTime: 7"));
        assert!(!text.contains("Rejected"));
    }

    #[test]
    fn unresolved_inputs_are_marked() {
        let tx = Transaction {
            version: 2,
            inputs: vec![TxInput {
                previous_output: OutPoint::new(Hash256([3; 32]), 0),
                unlocking_script: Script::default(),
                sequence: 0,
            }],
            outputs: vec![TxOutput { value: 1, locking_script: Script::p2pkh(&[3; 20]) }],
            lock_time: 0,
        };
        let itx = InspectedTransaction::new_base(tx).unwrap();
        assert!(itx.render(Network::Testnet).contains("(unresolved)"));
    }
}
