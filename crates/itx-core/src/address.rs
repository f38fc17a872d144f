//! Base58Check addresses for rendering locking scripts.
//!
//! Only P2PKH and P2SH templates map to an address. Addresses are never
//! parsed back into scripts here; they exist for human-readable output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::{
    P2PKH_VERSION_MAINNET, P2PKH_VERSION_TESTNET, P2SH_VERSION_MAINNET, P2SH_VERSION_TESTNET,
};
use crate::error::AddressError;
use crate::script::Script;

/// Which network a transaction belongs to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    /// True for the test network. Protocol envelopes are tagged differently
    /// on test networks.
    pub fn is_test(&self) -> bool {
        matches!(self, Network::Testnet)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            other => Err(AddressError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Address template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    PubKeyHash,
    ScriptHash,
}

/// A Base58Check-encodable address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    kind: AddressKind,
    hash: [u8; 20],
    network: Network,
}

impl Address {
    /// Classify a locking script. Fails for anything but P2PKH/P2SH.
    pub fn from_locking_script(script: &Script, network: Network) -> Result<Self, AddressError> {
        if let Some(hash) = script.p2pkh_hash() {
            return Ok(Self {
                kind: AddressKind::PubKeyHash,
                hash,
                network,
            });
        }
        if let Some(hash) = script.p2sh_hash() {
            return Ok(Self {
                kind: AddressKind::ScriptHash,
                hash,
                network,
            });
        }
        Err(AddressError::UnknownTemplate)
    }

    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    pub fn hash(&self) -> &[u8; 20] {
        &self.hash
    }

    pub fn network(&self) -> Network {
        self.network
    }

    fn version_byte(&self) -> u8 {
        match (self.kind, self.network) {
            (AddressKind::PubKeyHash, Network::Mainnet) => P2PKH_VERSION_MAINNET,
            (AddressKind::PubKeyHash, Network::Testnet) => P2PKH_VERSION_TESTNET,
            (AddressKind::ScriptHash, Network::Mainnet) => P2SH_VERSION_MAINNET,
            (AddressKind::ScriptHash, Network::Testnet) => P2SH_VERSION_TESTNET,
        }
    }

    /// Base58Check encoding: version || hash || first four bytes of double SHA-256.
    pub fn encode(&self) -> String {
        let mut payload = Vec::with_capacity(25);
        payload.push(self.version_byte());
        payload.extend_from_slice(&self.hash);
        let checksum = Sha256::digest(Sha256::digest(&payload));
        payload.extend_from_slice(&checksum[..4]);
        bs58::encode(payload).into_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_is_test() {
        assert!(Network::Testnet.is_test());
        assert!(!Network::Mainnet.is_test());
        assert_eq!(Network::default(), Network::Mainnet);
    }

    #[test]
    fn network_parse() {
        assert_eq!("mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("TEST".parse::<Network>().unwrap(), Network::Testnet);
        assert_eq!(
            "regtest".parse::<Network>().unwrap_err(),
            AddressError::UnknownNetwork("regtest".into())
        );
    }

    #[test]
    fn zero_hash_mainnet_p2pkh_is_well_known() {
        let script = Script::p2pkh(&[0u8; 20]);
        let addr = Address::from_locking_script(&script, Network::Mainnet).unwrap();
        assert_eq!(addr.kind(), AddressKind::PubKeyHash);
        assert_eq!(addr.to_string(), "1111111111111111111114oLvT2");
    }

    #[test]
    fn testnet_p2pkh_uses_m_or_n_prefix() {
        let script = Script::p2pkh(&[0x33; 20]);
        let addr = Address::from_locking_script(&script, Network::Testnet).unwrap();
        let s = addr.to_string();
        assert!(s.starts_with('m') || s.starts_with('n'), "{s}");
    }

    #[test]
    fn mainnet_p2sh_starts_with_3() {
        let script = Script::p2sh(&[0x44; 20]);
        let addr = Address::from_locking_script(&script, Network::Mainnet).unwrap();
        assert_eq!(addr.kind(), AddressKind::ScriptHash);
        assert!(addr.to_string().starts_with('3'));
    }

    #[test]
    fn data_script_has_no_address() {
        let script = Script(vec![0x00, 0x6a, 0x01, 0x01]);
        assert_eq!(
            Address::from_locking_script(&script, Network::Mainnet).unwrap_err(),
            AddressError::UnknownTemplate
        );
    }
}
