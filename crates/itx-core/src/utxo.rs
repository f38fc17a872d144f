//! Unspent output records.

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use crate::error::WireError;
use crate::script::Script;
use crate::types::{Hash256, OutPoint, TxOutput};
use crate::wire;

/// The value and locking script of a spendable output, keyed by its outpoint.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Utxo {
    pub txid: Hash256,
    pub index: u32,
    pub value: u64,
    pub locking_script: Script,
}

impl Utxo {
    /// Build a record for output `index` of transaction `txid`.
    pub fn from_output(txid: Hash256, index: u32, output: &TxOutput) -> Self {
        Self {
            txid,
            index,
            value: output.value,
            locking_script: output.locking_script.clone(),
        }
    }

    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.txid, self.index)
    }

    /// True if this record describes the output referenced by `outpoint`.
    pub fn matches(&self, outpoint: &OutPoint) -> bool {
        self.txid == outpoint.txid && self.index == outpoint.index
    }

    /// Append the standalone record layout: txid, index, value, script.
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_slice(&self.txid.0);
        buf.put_u32_le(self.index);
        buf.put_u64_le(self.value);
        wire::put_var_bytes(buf, self.locking_script.as_bytes());
    }

    pub fn decode(buf: &mut impl Buf) -> Result<Self, WireError> {
        let txid = Hash256(wire::get_array32(buf)?);
        let index = wire::get_u32_le(buf)?;
        let value = wire::get_u64_le(buf)?;
        let locking_script = Script(wire::get_var_bytes(buf)?);
        Ok(Self {
            txid,
            index,
            value,
            locking_script,
        })
    }
}

/// An ordered set of unspent outputs.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Utxos(pub Vec<Utxo>);

impl Utxos {
    /// Total value of the set. Returns None on overflow.
    pub fn value(&self) -> Option<u64> {
        self.0.iter().try_fold(0u64, |acc, u| acc.checked_add(u.value))
    }

    /// The records locked by exactly `locking_script`, in order.
    pub fn for_locking_script(&self, locking_script: &Script) -> Utxos {
        Utxos(
            self.0
                .iter()
                .filter(|u| &u.locking_script == locking_script)
                .cloned()
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Utxo> {
        self.0.iter()
    }
}

impl From<Vec<Utxo>> for Utxos {
    fn from(utxos: Vec<Utxo>) -> Self {
        Self(utxos)
    }
}

impl IntoIterator for Utxos {
    type Item = Utxo;
    type IntoIter = std::vec::IntoIter<Utxo>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Utxos {
    type Item = &'a Utxo;
    type IntoIter = std::slice::Iter<'a, Utxo>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utxo(seed: u8, value: u64, script: &Script) -> Utxo {
        Utxo {
            txid: Hash256([seed; 32]),
            index: seed as u32,
            value,
            locking_script: script.clone(),
        }
    }

    #[test]
    fn value_sums_records() {
        let a = Script::p2pkh(&[1; 20]);
        let set = Utxos(vec![utxo(1, 100, &a), utxo(2, 250, &a)]);
        assert_eq!(set.value(), Some(350));
        assert_eq!(Utxos::default().value(), Some(0));
    }

    #[test]
    fn value_overflow_returns_none() {
        let a = Script::p2pkh(&[1; 20]);
        let set = Utxos(vec![utxo(1, u64::MAX, &a), utxo(2, 1, &a)]);
        assert_eq!(set.value(), None);
    }

    #[test]
    fn filter_by_locking_script_keeps_order() {
        let a = Script::p2pkh(&[1; 20]);
        let b = Script::p2pkh(&[2; 20]);
        let set = Utxos(vec![utxo(1, 10, &a), utxo(2, 20, &b), utxo(3, 30, &a)]);
        let filtered = set.for_locking_script(&a);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.0[0].index, 1);
        assert_eq!(filtered.0[1].index, 3);
        assert!(set.for_locking_script(&Script::default()).is_empty());
    }

    #[test]
    fn matches_requires_txid_and_index() {
        let u = utxo(4, 1, &Script::default());
        assert!(u.matches(&OutPoint::new(Hash256([4; 32]), 4)));
        assert!(!u.matches(&OutPoint::new(Hash256([4; 32]), 5)));
        assert!(!u.matches(&OutPoint::new(Hash256([5; 32]), 4)));
    }

    #[test]
    fn record_layout_is_stable() {
        let u = utxo(7, 0x0102, &Script(vec![0xAB, 0xCD]));
        let mut out = Vec::new();
        u.encode(&mut out);
        assert_eq!(out.len(), 32 + 4 + 8 + 1 + 2);
        assert_eq!(&out[32..36], &7u32.to_le_bytes());
        assert_eq!(&out[36..44], &0x0102u64.to_le_bytes());
        assert_eq!(&out[44..], &[2, 0xAB, 0xCD]);
        let mut buf = out.as_slice();
        assert_eq!(Utxo::decode(&mut buf).unwrap(), u);
    }
}
