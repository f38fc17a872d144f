//! Rejection codes recorded against transactions carrying invalid actions.

pub const SUCCESS: u8 = 0;
pub const MSG_MALFORMED: u8 = 1;
pub const TX_MALFORMED: u8 = 2;
pub const TIMEOUT: u8 = 3;
pub const CONTRACT_MOVED: u8 = 4;
pub const DOUBLE_SPEND: u8 = 5;
pub const CONTRACT_EXISTS: u8 = 10;
pub const CONTRACT_NOT_PERMITTED: u8 = 13;
pub const INSTRUMENT_CODE_EXISTS: u8 = 20;
pub const INSTRUMENT_NOT_PERMITTED: u8 = 23;
pub const INSUFFICIENT_QUANTITY: u8 = 31;
pub const HOLDING_FROZEN: u8 = 32;
pub const NOT_ADMINISTRATION: u8 = 40;
pub const INSUFFICIENT_VALUE: u8 = 50;

/// Short label for a rejection code, for display.
pub fn reject_code_label(code: u8) -> &'static str {
    match code {
        SUCCESS => "Success",
        MSG_MALFORMED => "MsgMalformed",
        TX_MALFORMED => "TxMalformed",
        TIMEOUT => "Timeout",
        CONTRACT_MOVED => "ContractMoved",
        DOUBLE_SPEND => "DoubleSpend",
        CONTRACT_EXISTS => "ContractExists",
        CONTRACT_NOT_PERMITTED => "ContractNotPermitted",
        INSTRUMENT_CODE_EXISTS => "InstrumentCodeExists",
        INSTRUMENT_NOT_PERMITTED => "InstrumentNotPermitted",
        INSUFFICIENT_QUANTITY => "InsufficientQuantity",
        HOLDING_FROZEN => "HoldingFrozen",
        NOT_ADMINISTRATION => "NotAdministration",
        INSUFFICIENT_VALUE => "InsufficientValue",
        _ => "Unknown",
    }
}
