//! Locking and unlocking scripts.
//!
//! Scripts are opaque byte strings to the inspector. Only the handful of
//! templates needed for classification and rendering are understood here.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::WireError;

pub const OP_FALSE: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;
pub const OP_RETURN: u8 = 0x6a;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;

/// A raw script.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Script(pub Vec<u8>);

impl Script {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pay-to-public-key-hash locking script for a 20-byte hash.
    pub fn p2pkh(hash160: &[u8; 20]) -> Self {
        let mut bytes = Vec::with_capacity(25);
        bytes.extend_from_slice(&[OP_DUP, OP_HASH160, 20]);
        bytes.extend_from_slice(hash160);
        bytes.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
        Self(bytes)
    }

    /// Pay-to-script-hash locking script for a 20-byte hash.
    pub fn p2sh(hash160: &[u8; 20]) -> Self {
        let mut bytes = Vec::with_capacity(23);
        bytes.extend_from_slice(&[OP_HASH160, 20]);
        bytes.extend_from_slice(hash160);
        bytes.push(OP_EQUAL);
        Self(bytes)
    }

    /// True for data-carrier scripts that can never be spent
    /// (`OP_RETURN ...` or `OP_FALSE OP_RETURN ...`).
    pub fn is_unspendable(&self) -> bool {
        match self.0.as_slice() {
            [OP_RETURN, ..] => true,
            [OP_FALSE, OP_RETURN, ..] => true,
            _ => false,
        }
    }

    /// The 20-byte hash of a P2PKH locking script.
    pub fn p2pkh_hash(&self) -> Option<[u8; 20]> {
        match self.0.as_slice() {
            [OP_DUP, OP_HASH160, 20, hash @ .., OP_EQUALVERIFY, OP_CHECKSIG] if hash.len() == 20 => {
                hash.try_into().ok()
            }
            _ => None,
        }
    }

    /// The 20-byte hash of a P2SH locking script.
    pub fn p2sh_hash(&self) -> Option<[u8; 20]> {
        match self.0.as_slice() {
            [OP_HASH160, 20, hash @ .., OP_EQUAL] if hash.len() == 20 => hash.try_into().ok(),
            _ => None,
        }
    }

    /// Split the script into its elements: opcodes and data pushes.
    pub fn elements(&self) -> Result<Vec<ScriptElement<'_>>, WireError> {
        let data = self.0.as_slice();
        let mut out = Vec::new();
        let mut pos = 0;
        while pos < data.len() {
            let op = data[pos];
            let (header, len) = match op {
                0x01..=0x4b => (1, op as usize),
                OP_PUSHDATA1 => (2, read_len(data, pos + 1, 1)?),
                OP_PUSHDATA2 => (3, read_len(data, pos + 1, 2)?),
                OP_PUSHDATA4 => (5, read_len(data, pos + 1, 4)?),
                _ => {
                    out.push(ScriptElement::Op(op));
                    pos += 1;
                    continue;
                }
            };
            let start = pos + header;
            let end = start
                .checked_add(len)
                .filter(|end| *end <= data.len())
                .ok_or(WireError::TruncatedPush(pos))?;
            out.push(ScriptElement::Push(&data[start..end]));
            pos = end;
        }
        Ok(out)
    }

    /// Number of elements in the script, or `None` if a push is truncated.
    pub fn element_count(&self) -> Option<usize> {
        self.elements().ok().map(|e| e.len())
    }
}

fn read_len(data: &[u8], at: usize, width: usize) -> Result<usize, WireError> {
    let bytes = data.get(at..at + width).ok_or(WireError::TruncatedPush(at - 1))?;
    let mut value = 0usize;
    for (i, b) in bytes.iter().enumerate() {
        value |= (*b as usize) << (8 * i);
    }
    Ok(value)
}

/// Append the minimal push operation for `data`.
pub fn push_data(script: &mut Vec<u8>, data: &[u8]) {
    let len = data.len();
    if len == 0 {
        script.push(OP_FALSE);
        return;
    }
    if len <= 0x4b {
        script.push(len as u8);
    } else if len <= 0xff {
        script.push(OP_PUSHDATA1);
        script.push(len as u8);
    } else if len <= 0xffff {
        script.push(OP_PUSHDATA2);
        script.extend_from_slice(&(len as u16).to_le_bytes());
    } else {
        script.push(OP_PUSHDATA4);
        script.extend_from_slice(&(len as u32).to_le_bytes());
    }
    script.extend_from_slice(data);
}

/// A single parsed script element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptElement<'a> {
    Op(u8),
    Push(&'a [u8]),
}

impl ScriptElement<'_> {
    /// Data carried by the element. `OP_FALSE` counts as an empty push.
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            ScriptElement::Push(data) => Some(data),
            ScriptElement::Op(OP_FALSE) => Some(&[]),
            ScriptElement::Op(_) => None,
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(elements) = self.elements() else {
            return write!(f, "{}", hex::encode(&self.0));
        };
        for (i, element) in elements.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match element {
                ScriptElement::Push(data) => write!(f, "0x{}", hex::encode(data))?,
                ScriptElement::Op(op) => f.write_str(&opcode_name(*op))?,
            }
        }
        Ok(())
    }
}

fn opcode_name(op: u8) -> String {
    match op {
        OP_FALSE => "OP_FALSE".into(),
        OP_1NEGATE => "OP_1NEGATE".into(),
        OP_1..=OP_16 => format!("OP_{}", op - OP_1 + 1),
        OP_RETURN => "OP_RETURN".into(),
        OP_DUP => "OP_DUP".into(),
        OP_EQUAL => "OP_EQUAL".into(),
        OP_EQUALVERIFY => "OP_EQUALVERIFY".into(),
        OP_HASH160 => "OP_HASH160".into(),
        OP_CHECKSIG => "OP_CHECKSIG".into(),
        other => format!("OP_0x{other:02x}"),
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Script {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Script {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Script {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map(Script).map_err(serde::de::Error::custom)
    }
}
