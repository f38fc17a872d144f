//! Versioned record format.
//!
//! ```text
//! version        u8            0..=3
//! tx             wire format
//! input count    u32 LE        versions >= 2 only; else the tx input count
//! inputs         per version   see below
//! reject code    u8
//! ```
//!
//! Input layouts:
//! - v0: a full previous transaction. Value and script are not recoverable.
//! - v1, v2: a standalone utxo record (txid, index, value, script).
//! - v3: value u64 LE, CompactSize script length, script bytes.
//!
//! Writers always emit v3. Outputs are never stored; they are re-derived
//! from the transaction on read, and actions are re-detected.

use bytes::{Buf, BufMut};
use rand::Rng;
use tracing::debug;

use itx_core::address::Network;
use itx_core::error::WireError;
use itx_core::script::Script;
use itx_core::types::{Hash256, Transaction};
use itx_core::utxo::Utxo;
use itx_core::wire;
use itx_protocol::ProtocolCodec;

use crate::detect;
use crate::error::InspectorError;
use crate::transaction::{InspectedTransaction, Rejection, ResolvedInput, State};

/// Record format generations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum FormatVersion {
    V0 = 0,
    V1 = 1,
    V2 = 2,
    V3 = 3,
}

impl FormatVersion {
    pub const CURRENT: FormatVersion = FormatVersion::V3;

    /// Whether an explicit input count follows the transaction.
    pub fn has_input_count(self) -> bool {
        self >= FormatVersion::V2
    }
}

impl TryFrom<u8> for FormatVersion {
    type Error = InspectorError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FormatVersion::V0),
            1 => Ok(FormatVersion::V1),
            2 => Ok(FormatVersion::V2),
            3 => Ok(FormatVersion::V3),
            other => Err(InspectorError::UnknownVersion(other)),
        }
    }
}

type InputReader = fn(&mut &[u8]) -> Result<ResolvedInput, WireError>;

/// Indexed by version byte.
const INPUT_READERS: [InputReader; 4] = [read_input_v0, read_input_utxo, read_input_utxo, read_input_v3];

fn read_input_v0(buf: &mut &[u8]) -> Result<ResolvedInput, WireError> {
    Transaction::decode(buf)?;
    Ok(ResolvedInput::default())
}

fn read_input_utxo(buf: &mut &[u8]) -> Result<ResolvedInput, WireError> {
    let utxo = Utxo::decode(buf)?;
    Ok(ResolvedInput {
        value: utxo.value,
        locking_script: utxo.locking_script,
        action: None,
    })
}

fn read_input_v3(buf: &mut &[u8]) -> Result<ResolvedInput, WireError> {
    let value = wire::get_u64_le(buf)?;
    let locking_script = Script(wire::get_var_bytes(buf)?);
    Ok(ResolvedInput {
        value,
        locking_script,
        action: None,
    })
}

fn write_input_v3(buf: &mut impl BufMut, input: &ResolvedInput) {
    buf.put_u64_le(input.value);
    wire::put_var_bytes(buf, input.locking_script.as_bytes());
}

impl InspectedTransaction {
    /// Append the current-version encoding to `buf`.
    pub fn write(&self, buf: &mut impl BufMut) {
        let state = self.state.read();
        buf.put_u8(FormatVersion::CURRENT as u8);
        self.tx().encode(buf);
        buf.put_u32_le(state.inputs.len() as u32);
        for input in &state.inputs {
            write_input_v3(buf, input);
        }
        buf.put_u8(state.rejection.as_ref().map_or(0, |r| r.code));
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write(&mut out);
        out
    }

    /// Version-2 encoding, for migration testing only.
    ///
    /// Each input is written as a utxo record keyed by a random txid and
    /// index 1; readers only keep value and script.
    pub fn encode_legacy_v2(&self) -> Vec<u8> {
        let state = self.state.read();
        let mut rng = rand::thread_rng();
        let mut out = Vec::new();
        out.put_u8(FormatVersion::V2 as u8);
        self.tx().encode(&mut out);
        out.put_u32_le(state.inputs.len() as u32);
        for input in &state.inputs {
            let mut txid = [0u8; 32];
            rng.fill(&mut txid);
            Utxo {
                txid: Hash256(txid),
                index: 1,
                value: input.value,
                locking_script: input.locking_script.clone(),
            }
            .encode(&mut out);
        }
        out.put_u8(state.rejection.as_ref().map_or(0, |r| r.code));
        out
    }

    /// Read one record from the front of `buf`, leaving any remainder.
    ///
    /// Actions are detected afresh for inputs and outputs. Rejection text is
    /// not stored, so a decoded rejection carries only its code.
    pub fn read(
        buf: &mut &[u8],
        codec: &dyn ProtocolCodec,
        network: Network,
    ) -> Result<Self, InspectorError> {
        let version = FormatVersion::try_from(wire::get_u8(buf)?)?;
        let tx = Transaction::decode(buf)?;

        let count = if version.has_input_count() {
            wire::get_u32_le(buf)? as usize
        } else {
            tx.inputs.len()
        };

        let read_input = INPUT_READERS[version as usize];
        let mut inputs = Vec::with_capacity(count.min(buf.remaining()));
        for _ in 0..count {
            inputs.push(read_input(buf)?);
        }

        let reject_code = wire::get_u8(buf)?;
        let rejection = (reject_code != 0).then(|| Rejection {
            code: reject_code,
            text: String::new(),
        });

        detect::detect_inputs(codec, &mut inputs, network);
        let outputs = detect::parse_outputs(codec, &tx, network);
        let promoted = inputs.len() == tx.inputs.len() && !outputs.is_empty();
        debug!(?version, inputs = inputs.len(), "decoded record");

        let id = tx.txid();
        Ok(Self::from_parts(
            id,
            tx,
            State {
                inputs,
                outputs,
                rejection,
                promoted,
            },
        ))
    }

    /// Decode a record that must span all of `data`.
    pub fn decode(
        data: &[u8],
        codec: &dyn ProtocolCodec,
        network: Network,
    ) -> Result<Self, InspectorError> {
        let mut buf = data;
        let itx = Self::read(&mut buf, codec, network)?;
        if !buf.is_empty() {
            return Err(WireError::TrailingBytes(buf.len()).into());
        }
        Ok(itx)
    }
}
