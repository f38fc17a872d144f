//! Core ledger types: hashes, outpoints, and transactions.
//!
//! All monetary values are in satoshis. The transaction byte layout is the
//! legacy (non-segregated-witness) wire format; the transaction id is the
//! double SHA-256 of that encoding.

use std::fmt;
use std::str::FromStr;

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::COINBASE_INDEX;
use crate::error::WireError;
use crate::script::Script;
use crate::wire;

/// A 32-byte hash value, stored in internal (little-endian) byte order.
///
/// Displayed and parsed byte-reversed, matching block explorer conventions.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Double SHA-256 of `data`.
    pub fn double_sha256(data: &[u8]) -> Self {
        let first = Sha256::digest(data);
        Self(Sha256::digest(first).into())
    }

    /// Parse from display (byte-reversed) hex.
    pub fn from_hex(s: &str) -> Result<Self, WireError> {
        let mut bytes: [u8; 32] = hex::decode(s.trim())
            .map_err(|e| WireError::InvalidHex(e.to_string()))?
            .try_into()
            .map_err(|v: Vec<u8>| WireError::InvalidHex(format!("expected 32 bytes, got {}", v.len())))?;
        bytes.reverse();
        Ok(Self(bytes))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter().rev() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for Hash256 {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Reference to a specific output of a previous transaction.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OutPoint {
    /// Transaction ID containing the referenced output.
    pub txid: Hash256,
    /// Index of the output within the transaction.
    pub index: u32,
}

impl OutPoint {
    pub fn new(txid: Hash256, index: u32) -> Self {
        Self { txid, index }
    }

    /// The outpoint carried by coinbase inputs.
    pub fn coinbase() -> Self {
        Self {
            txid: Hash256::ZERO,
            index: COINBASE_INDEX,
        }
    }

    /// Coinbase inputs are marked by the reserved index alone.
    pub fn is_coinbase(&self) -> bool {
        self.index == COINBASE_INDEX
    }

    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_slice(&self.txid.0);
        buf.put_u32_le(self.index);
    }

    pub fn decode(buf: &mut impl Buf) -> Result<Self, WireError> {
        let txid = Hash256(wire::get_array32(buf)?);
        let index = wire::get_u32_le(buf)?;
        Ok(Self { txid, index })
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.index)
    }
}

/// A transaction input, spending a previous output.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TxInput {
    /// The outpoint being spent.
    pub previous_output: OutPoint,
    /// Script satisfying the previous output's locking script.
    pub unlocking_script: Script,
    pub sequence: u32,
}

/// A transaction output, creating a new spendable output.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TxOutput {
    /// Value in satoshis.
    pub value: u64,
    pub locking_script: Script,
}

/// A raw transaction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub lock_time: u32,
}

impl Transaction {
    /// Append the wire encoding of this transaction.
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_i32_le(self.version);
        wire::put_varint(buf, self.inputs.len() as u64);
        for input in &self.inputs {
            input.previous_output.encode(buf);
            wire::put_var_bytes(buf, input.unlocking_script.as_bytes());
            buf.put_u32_le(input.sequence);
        }
        wire::put_varint(buf, self.outputs.len() as u64);
        for output in &self.outputs {
            buf.put_u64_le(output.value);
            wire::put_var_bytes(buf, output.locking_script.as_bytes());
        }
        buf.put_u32_le(self.lock_time);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_size());
        self.encode(&mut out);
        out
    }

    /// Read one transaction from the front of `buf`, leaving any remainder.
    pub fn decode(buf: &mut impl Buf) -> Result<Self, WireError> {
        let version = wire::get_i32_le(buf)?;

        // Every input occupies at least 41 bytes, so a count larger than the
        // remaining data cannot be honest.
        let input_count = wire::get_varint(buf)?;
        if input_count > buf.remaining() as u64 {
            return Err(WireError::LengthOverflow(input_count));
        }
        let mut inputs = Vec::with_capacity(input_count as usize);
        for _ in 0..input_count {
            let previous_output = OutPoint::decode(buf)?;
            let unlocking_script = Script(wire::get_var_bytes(buf)?);
            let sequence = wire::get_u32_le(buf)?;
            inputs.push(TxInput {
                previous_output,
                unlocking_script,
                sequence,
            });
        }

        let output_count = wire::get_varint(buf)?;
        if output_count > buf.remaining() as u64 {
            return Err(WireError::LengthOverflow(output_count));
        }
        let mut outputs = Vec::with_capacity(output_count as usize);
        for _ in 0..output_count {
            let value = wire::get_u64_le(buf)?;
            let locking_script = Script(wire::get_var_bytes(buf)?);
            outputs.push(TxOutput {
                value,
                locking_script,
            });
        }

        let lock_time = wire::get_u32_le(buf)?;
        Ok(Self {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    /// Decode a transaction that must span all of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self, WireError> {
        let mut buf = data;
        let tx = Self::decode(&mut buf)?;
        if !buf.is_empty() {
            return Err(WireError::TrailingBytes(buf.len()));
        }
        Ok(tx)
    }

    /// Encoded size in bytes.
    pub fn serialized_size(&self) -> usize {
        let inputs: usize = self
            .inputs
            .iter()
            .map(|i| 36 + wire::varint_size(i.unlocking_script.len() as u64) + i.unlocking_script.len() + 4)
            .sum();
        let outputs: usize = self
            .outputs
            .iter()
            .map(|o| 8 + wire::varint_size(o.locking_script.len() as u64) + o.locking_script.len())
            .sum();
        4 + wire::varint_size(self.inputs.len() as u64)
            + inputs
            + wire::varint_size(self.outputs.len() as u64)
            + outputs
            + 4
    }

    /// Transaction id: double SHA-256 of the wire encoding.
    pub fn txid(&self) -> Hash256 {
        Hash256::double_sha256(&self.to_bytes())
    }

    /// A coinbase transaction has a single input carrying the coinbase outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].previous_output.is_coinbase()
    }

    /// Sum of all output values. Returns None on overflow.
    pub fn total_output_value(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.value))
    }
}
