//! Action codes and the request/response classification tables.

use std::collections::HashSet;
use std::sync::LazyLock;

// Contracts
pub const CONTRACT_OFFER: &str = "C1";
pub const CONTRACT_FORMATION: &str = "C2";
pub const CONTRACT_AMENDMENT: &str = "C3";
pub const STATIC_CONTRACT_FORMATION: &str = "C4";
pub const CONTRACT_ADDRESS_CHANGE: &str = "C5";
pub const BODY_OF_AGREEMENT_OFFER: &str = "C6";
pub const BODY_OF_AGREEMENT_FORMATION: &str = "C7";
pub const BODY_OF_AGREEMENT_AMENDMENT: &str = "C8";

// Instruments
pub const INSTRUMENT_DEFINITION: &str = "I1";
pub const INSTRUMENT_CREATION: &str = "I2";
pub const INSTRUMENT_MODIFICATION: &str = "I3";

// Deprecated asset actions, still recognized for old transactions.
pub const ASSET_DEFINITION: &str = "A1";
pub const ASSET_CREATION: &str = "A2";
pub const ASSET_MODIFICATION: &str = "A3";

// Transfers
pub const TRANSFER: &str = "T1";
pub const SETTLEMENT: &str = "T2";

// Governance
pub const PROPOSAL: &str = "G1";
pub const VOTE: &str = "G2";
pub const BALLOT_CAST: &str = "G3";
pub const BALLOT_COUNTED: &str = "G4";
pub const RESULT: &str = "G5";

// Enforcement
pub const ORDER: &str = "E1";
pub const FREEZE: &str = "E2";
pub const THAW: &str = "E3";
pub const CONFISCATION: &str = "E4";
pub const RECONCILIATION: &str = "E5";

// Messages
pub const MESSAGE: &str = "M1";
pub const REJECTION: &str = "M2";

/// Codes of actions sent to a contract to ask for something.
pub static REQUEST_CODES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        CONTRACT_OFFER,
        CONTRACT_AMENDMENT,
        BODY_OF_AGREEMENT_OFFER,
        BODY_OF_AGREEMENT_AMENDMENT,
        INSTRUMENT_DEFINITION,
        INSTRUMENT_MODIFICATION,
        ASSET_DEFINITION,
        ASSET_MODIFICATION,
        TRANSFER,
        PROPOSAL,
        BALLOT_CAST,
        ORDER,
        CONTRACT_ADDRESS_CHANGE,
    ])
});

/// Codes of actions a contract emits in reply to a request.
pub static RESPONSE_CODES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        INSTRUMENT_CREATION,
        ASSET_CREATION,
        CONTRACT_FORMATION,
        BODY_OF_AGREEMENT_FORMATION,
        SETTLEMENT,
        VOTE,
        BALLOT_COUNTED,
        RESULT,
        FREEZE,
        THAW,
        CONFISCATION,
        RECONCILIATION,
        REJECTION,
    ])
});

pub fn is_request_code(code: &str) -> bool {
    REQUEST_CODES.contains(code)
}

pub fn is_response_code(code: &str) -> bool {
    RESPONSE_CODES.contains(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_and_response_tables_are_disjoint() {
        assert!(REQUEST_CODES.is_disjoint(&RESPONSE_CODES));
    }

    #[test]
    fn table_sizes() {
        assert_eq!(REQUEST_CODES.len(), 13);
        assert_eq!(RESPONSE_CODES.len(), 13);
    }

    #[test]
    fn neutral_codes_are_in_neither_table() {
        for code in [MESSAGE, STATIC_CONTRACT_FORMATION] {
            assert!(!is_request_code(code));
            assert!(!is_response_code(code));
        }
    }

    #[test]
    fn classification() {
        assert!(is_request_code(TRANSFER));
        assert!(is_response_code(SETTLEMENT));
        assert!(!is_request_code("ZZ"));
    }
}
