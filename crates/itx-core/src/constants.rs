//! Ledger constants. All monetary values in satoshis (1 coin = 10^8 satoshis).

pub const COIN: u64 = 100_000_000;

/// Outpoint index reserved for coinbase inputs.
pub const COINBASE_INDEX: u32 = 0xFFFF_FFFF;

/// Default transaction version written by [`TxBuilder`](crate::builder::TxBuilder).
pub const DEFAULT_TX_VERSION: i32 = 1;

/// Default input sequence (final).
pub const DEFAULT_SEQUENCE: u32 = 0xFFFF_FFFF;

/// Base58Check version bytes for pay-to-public-key-hash addresses.
pub const P2PKH_VERSION_MAINNET: u8 = 0x00;
pub const P2PKH_VERSION_TESTNET: u8 = 0x6F;

/// Base58Check version bytes for pay-to-script-hash addresses.
pub const P2SH_VERSION_MAINNET: u8 = 0x05;
pub const P2SH_VERSION_TESTNET: u8 = 0xC4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coinbase_index_is_max_u32() {
        assert_eq!(COINBASE_INDEX, u32::MAX);
    }

    #[test]
    fn version_bytes_are_distinct() {
        let all = [
            P2PKH_VERSION_MAINNET,
            P2PKH_VERSION_TESTNET,
            P2SH_VERSION_MAINNET,
            P2SH_VERSION_TESTNET,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
