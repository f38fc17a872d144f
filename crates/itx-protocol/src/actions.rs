//! Action payloads and the [`Action`] tagged union.
//!
//! Every payload is encoded with bincode (standard config) inside an
//! envelope; see [`crate::envelope`]. Quantities are token counts and all
//! timestamps are nanoseconds since the Unix epoch.

use bincode::{Decode, Encode};
use serde::Serialize;

use crate::codes;
use crate::error::{ProtocolError, ValidationError};

/// Upper bound for free-text fields.
pub const MAX_TEXT_LEN: usize = 255;
/// Upper bound for long free-text fields (descriptions, messages).
pub const MAX_LONG_TEXT_LEN: usize = 65_535;
/// Size of an instrument code.
pub const INSTRUMENT_CODE_SIZE: usize = 20;
/// Size of an instrument type tag.
pub const INSTRUMENT_TYPE_SIZE: usize = 3;
/// Size of a transaction id referenced from a payload.
pub const TX_ID_SIZE: usize = 32;
/// Maximum operation value of an [`Amendment`].
pub const MAX_AMENDMENT_OPERATION: u32 = 2;

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

fn max_len(field: &'static str, len: usize, max: usize) -> Result<(), ValidationError> {
    if len > max {
        return Err(ValidationError::TooLong { field, len, max });
    }
    Ok(())
}

fn fixed(field: &'static str, bytes: &[u8], expected: usize) -> Result<(), ValidationError> {
    if bytes.len() != expected {
        return Err(ValidationError::WrongSize {
            field,
            expected,
            got: bytes.len(),
        });
    }
    Ok(())
}

/// Empty, or exactly `expected` bytes.
fn optional_fixed(field: &'static str, bytes: &[u8], expected: usize) -> Result<(), ValidationError> {
    if bytes.is_empty() {
        return Ok(());
    }
    fixed(field, bytes, expected)
}

fn instrument(instrument_type: &str, instrument_code: &[u8]) -> Result<(), ValidationError> {
    fixed("instrument_type", instrument_type.as_bytes(), INSTRUMENT_TYPE_SIZE)?;
    fixed("instrument_code", instrument_code, INSTRUMENT_CODE_SIZE)
}

fn non_empty<T>(field: &'static str, items: &[T]) -> Result<(), ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

fn amendments(list: &[Amendment]) -> Result<(), ValidationError> {
    for amendment in list {
        amendment.validate()?;
    }
    Ok(())
}

fn quantities(field: &'static str, list: &[QuantityIndex]) -> Result<(), ValidationError> {
    non_empty(field, list)?;
    if list.iter().any(|q| q.quantity == 0) {
        return Err(ValidationError::Invalid {
            field,
            reason: "zero quantity".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared sub-structures
// ---------------------------------------------------------------------------

/// A change to one field of a contract, agreement or instrument.
#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct Amendment {
    /// Path of field indexes identifying the amended field.
    pub field_index_path: Vec<u8>,
    /// 0 = modify, 1 = add element, 2 = delete element.
    pub operation: u32,
    pub data: Vec<u8>,
}

impl Amendment {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.field_index_path.is_empty() {
            return Err(ValidationError::Required {
                field: "field_index_path",
            });
        }
        if self.operation > MAX_AMENDMENT_OPERATION {
            return Err(ValidationError::Invalid {
                field: "operation",
                reason: format!("{} > {MAX_AMENDMENT_OPERATION}", self.operation),
            });
        }
        Ok(())
    }
}

/// A quantity attributed to an input or output index.
#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct QuantityIndex {
    pub index: u32,
    pub quantity: u64,
}

/// A receiving address (raw locking-script hash) and quantity.
#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressQuantity {
    pub address: Vec<u8>,
    pub quantity: u64,
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct InstrumentTransfer {
    pub contract_index: u32,
    pub instrument_type: String,
    pub instrument_code: Vec<u8>,
    pub senders: Vec<QuantityIndex>,
    pub receivers: Vec<AddressQuantity>,
}

impl InstrumentTransfer {
    fn validate(&self) -> Result<(), ValidationError> {
        instrument(&self.instrument_type, &self.instrument_code)?;
        quantities("senders", &self.senders)?;
        non_empty("receivers", &self.receivers)?;
        for receiver in &self.receivers {
            if receiver.address.is_empty() {
                return Err(ValidationError::Required { field: "receivers.address" });
            }
        }
        let sent = self.senders.iter().map(|s| u128::from(s.quantity)).sum::<u128>();
        let received = self.receivers.iter().map(|r| u128::from(r.quantity)).sum::<u128>();
        if sent != received {
            return Err(ValidationError::Invalid {
                field: "receivers",
                reason: format!("sent {sent} != received {received}"),
            });
        }
        Ok(())
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct InstrumentSettlement {
    pub contract_index: u32,
    pub instrument_type: String,
    pub instrument_code: Vec<u8>,
    pub settlements: Vec<QuantityIndex>,
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractOffer {
    pub contract_name: String,
    pub contract_type: String,
    pub governing_law: String,
    pub contract_uri: String,
    pub contract_fee: u64,
}

impl ContractOffer {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("contract_name", &self.contract_name)?;
        max_len("contract_name", self.contract_name.len(), MAX_TEXT_LEN)?;
        max_len("contract_type", self.contract_type.len(), MAX_TEXT_LEN)?;
        max_len("governing_law", self.governing_law.len(), 5)?;
        max_len("contract_uri", self.contract_uri.len(), MAX_TEXT_LEN)
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractFormation {
    pub contract_name: String,
    pub contract_type: String,
    pub governing_law: String,
    pub contract_uri: String,
    pub contract_fee: u64,
    pub contract_revision: u32,
    pub timestamp: u64,
}

impl ContractFormation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("contract_name", &self.contract_name)?;
        max_len("contract_name", self.contract_name.len(), MAX_TEXT_LEN)?;
        max_len("contract_type", self.contract_type.len(), MAX_TEXT_LEN)?;
        max_len("governing_law", self.governing_law.len(), 5)?;
        max_len("contract_uri", self.contract_uri.len(), MAX_TEXT_LEN)
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractAmendment {
    pub change_administration_address: bool,
    pub contract_revision: u32,
    pub amendments: Vec<Amendment>,
    pub ref_tx_id: Vec<u8>,
}

impl ContractAmendment {
    pub fn validate(&self) -> Result<(), ValidationError> {
        amendments(&self.amendments)?;
        optional_fixed("ref_tx_id", &self.ref_tx_id, TX_ID_SIZE)
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticContractFormation {
    pub contract_name: String,
    pub contract_code: Vec<u8>,
    pub contract_revision: u32,
    pub effective_date: u64,
}

impl StaticContractFormation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("contract_name", &self.contract_name)?;
        max_len("contract_name", self.contract_name.len(), MAX_TEXT_LEN)?;
        fixed("contract_code", &self.contract_code, 32)
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractAddressChange {
    pub new_contract_address: Vec<u8>,
    pub timestamp: u64,
}

impl ContractAddressChange {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.new_contract_address.is_empty() {
            return Err(ValidationError::Required {
                field: "new_contract_address",
            });
        }
        max_len("new_contract_address", self.new_contract_address.len(), 65)
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct BodyOfAgreementOffer {
    pub title: String,
    pub chapters: Vec<String>,
}

impl BodyOfAgreementOffer {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        max_len("title", self.title.len(), MAX_TEXT_LEN)?;
        for chapter in &self.chapters {
            max_len("chapters", chapter.len(), MAX_LONG_TEXT_LEN)?;
        }
        Ok(())
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct BodyOfAgreementFormation {
    pub title: String,
    pub chapters: Vec<String>,
    pub revision: u32,
    pub timestamp: u64,
}

impl BodyOfAgreementFormation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        max_len("title", self.title.len(), MAX_TEXT_LEN)?;
        for chapter in &self.chapters {
            max_len("chapters", chapter.len(), MAX_LONG_TEXT_LEN)?;
        }
        Ok(())
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct BodyOfAgreementAmendment {
    pub revision: u32,
    pub amendments: Vec<Amendment>,
    pub ref_tx_id: Vec<u8>,
}

impl BodyOfAgreementAmendment {
    pub fn validate(&self) -> Result<(), ValidationError> {
        amendments(&self.amendments)?;
        optional_fixed("ref_tx_id", &self.ref_tx_id, TX_ID_SIZE)
    }
}

// ---------------------------------------------------------------------------
// Instruments and deprecated assets
// ---------------------------------------------------------------------------

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct InstrumentDefinition {
    pub instrument_type: String,
    pub authorized_token_qty: u64,
    pub transfers_permitted: bool,
    pub instrument_payload: Vec<u8>,
}

impl InstrumentDefinition {
    pub fn validate(&self) -> Result<(), ValidationError> {
        fixed("instrument_type", self.instrument_type.as_bytes(), INSTRUMENT_TYPE_SIZE)?;
        max_len("instrument_payload", self.instrument_payload.len(), MAX_LONG_TEXT_LEN)
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct InstrumentCreation {
    pub instrument_type: String,
    pub instrument_code: Vec<u8>,
    pub instrument_index: u64,
    pub authorized_token_qty: u64,
    pub instrument_revision: u32,
    pub timestamp: u64,
}

impl InstrumentCreation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        instrument(&self.instrument_type, &self.instrument_code)
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct InstrumentModification {
    pub instrument_type: String,
    pub instrument_code: Vec<u8>,
    pub instrument_revision: u32,
    pub amendments: Vec<Amendment>,
    pub ref_tx_id: Vec<u8>,
}

impl InstrumentModification {
    pub fn validate(&self) -> Result<(), ValidationError> {
        instrument(&self.instrument_type, &self.instrument_code)?;
        amendments(&self.amendments)?;
        optional_fixed("ref_tx_id", &self.ref_tx_id, TX_ID_SIZE)
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetDefinition {
    pub asset_type: String,
    pub authorized_token_qty: u64,
    pub asset_payload: Vec<u8>,
}

impl AssetDefinition {
    pub fn validate(&self) -> Result<(), ValidationError> {
        fixed("asset_type", self.asset_type.as_bytes(), INSTRUMENT_TYPE_SIZE)?;
        max_len("asset_payload", self.asset_payload.len(), MAX_LONG_TEXT_LEN)
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetCreation {
    pub asset_type: String,
    pub asset_code: Vec<u8>,
    pub asset_index: u64,
    pub authorized_token_qty: u64,
    pub asset_revision: u32,
    pub timestamp: u64,
}

impl AssetCreation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        fixed("asset_type", self.asset_type.as_bytes(), INSTRUMENT_TYPE_SIZE)?;
        fixed("asset_code", &self.asset_code, INSTRUMENT_CODE_SIZE)
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetModification {
    pub asset_type: String,
    pub asset_code: Vec<u8>,
    pub asset_revision: u32,
    pub amendments: Vec<Amendment>,
    pub ref_tx_id: Vec<u8>,
}

impl AssetModification {
    pub fn validate(&self) -> Result<(), ValidationError> {
        fixed("asset_type", self.asset_type.as_bytes(), INSTRUMENT_TYPE_SIZE)?;
        fixed("asset_code", &self.asset_code, INSTRUMENT_CODE_SIZE)?;
        amendments(&self.amendments)?;
        optional_fixed("ref_tx_id", &self.ref_tx_id, TX_ID_SIZE)
    }
}

// ---------------------------------------------------------------------------
// Transfers
// ---------------------------------------------------------------------------

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct Transfer {
    pub instruments: Vec<InstrumentTransfer>,
    pub offer_expiry: u64,
    pub exchange_fee: u64,
}

impl Transfer {
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty("instruments", &self.instruments)?;
        for transfer in &self.instruments {
            transfer.validate()?;
        }
        Ok(())
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct Settlement {
    pub instruments: Vec<InstrumentSettlement>,
    pub timestamp: u64,
}

impl Settlement {
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty("instruments", &self.instruments)?;
        for settlement in &self.instruments {
            instrument(&settlement.instrument_type, &settlement.instrument_code)?;
            non_empty("settlements", &settlement.settlements)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Governance
// ---------------------------------------------------------------------------

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct Proposal {
    /// 0 = referendum, 1 = initiative.
    pub proposal_type: u32,
    pub instrument_type: String,
    pub instrument_code: Vec<u8>,
    pub vote_options: String,
    pub vote_max: u32,
    pub proposal_description: String,
    pub vote_cut_off_timestamp: u64,
}

impl Proposal {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.proposal_type > 1 {
            return Err(ValidationError::Invalid {
                field: "proposal_type",
                reason: format!("unknown type {}", self.proposal_type),
            });
        }
        if !self.instrument_type.is_empty() || !self.instrument_code.is_empty() {
            instrument(&self.instrument_type, &self.instrument_code)?;
        }
        required("vote_options", &self.vote_options)?;
        max_len("vote_options", self.vote_options.len(), MAX_TEXT_LEN)?;
        if self.vote_max == 0 || self.vote_max as usize > self.vote_options.len() {
            return Err(ValidationError::Invalid {
                field: "vote_max",
                reason: format!("{} not in 1..={}", self.vote_max, self.vote_options.len()),
            });
        }
        max_len("proposal_description", self.proposal_description.len(), MAX_LONG_TEXT_LEN)
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct Vote {
    pub timestamp: u64,
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct BallotCast {
    pub vote_tx_id: Vec<u8>,
    pub vote: String,
}

impl BallotCast {
    pub fn validate(&self) -> Result<(), ValidationError> {
        fixed("vote_tx_id", &self.vote_tx_id, TX_ID_SIZE)?;
        required("vote", &self.vote)?;
        max_len("vote", self.vote.len(), MAX_TEXT_LEN)
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct BallotCounted {
    pub vote_tx_id: Vec<u8>,
    pub vote: String,
    pub quantity: u64,
    pub timestamp: u64,
}

impl BallotCounted {
    pub fn validate(&self) -> Result<(), ValidationError> {
        fixed("vote_tx_id", &self.vote_tx_id, TX_ID_SIZE)?;
        max_len("vote", self.vote.len(), MAX_TEXT_LEN)
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct VoteResult {
    pub instrument_type: String,
    pub instrument_code: Vec<u8>,
    pub proposed_amendments: Vec<Amendment>,
    pub vote_tx_id: Vec<u8>,
    pub option_tally: Vec<u64>,
    pub result: String,
    pub timestamp: u64,
}

impl VoteResult {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.instrument_type.is_empty() || !self.instrument_code.is_empty() {
            instrument(&self.instrument_type, &self.instrument_code)?;
        }
        amendments(&self.proposed_amendments)?;
        fixed("vote_tx_id", &self.vote_tx_id, TX_ID_SIZE)?;
        max_len("result", self.result.len(), MAX_TEXT_LEN)
    }
}

// ---------------------------------------------------------------------------
// Enforcement
// ---------------------------------------------------------------------------

pub const COMPLIANCE_FREEZE: u8 = b'F';
pub const COMPLIANCE_THAW: u8 = b'T';
pub const COMPLIANCE_CONFISCATE: u8 = b'C';
pub const COMPLIANCE_RECONCILE: u8 = b'R';

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct Order {
    pub compliance_action: u8,
    pub instrument_type: String,
    pub instrument_code: Vec<u8>,
    pub target_addresses: Vec<AddressQuantity>,
    pub freeze_tx_id: Vec<u8>,
    pub freeze_period: u64,
    pub message: String,
}

impl Order {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.compliance_action {
            COMPLIANCE_FREEZE | COMPLIANCE_CONFISCATE | COMPLIANCE_RECONCILE => {
                non_empty("target_addresses", &self.target_addresses)?;
                if !self.instrument_code.is_empty() {
                    instrument(&self.instrument_type, &self.instrument_code)?;
                }
            }
            COMPLIANCE_THAW => fixed("freeze_tx_id", &self.freeze_tx_id, TX_ID_SIZE)?,
            other => {
                return Err(ValidationError::Invalid {
                    field: "compliance_action",
                    reason: format!("unknown action {other:#04x}"),
                });
            }
        }
        max_len("message", self.message.len(), MAX_LONG_TEXT_LEN)
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct Freeze {
    pub instrument_type: String,
    pub instrument_code: Vec<u8>,
    pub quantities: Vec<QuantityIndex>,
    pub freeze_period: u64,
    pub timestamp: u64,
}

impl Freeze {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.instrument_code.is_empty() {
            instrument(&self.instrument_type, &self.instrument_code)?;
        }
        non_empty("quantities", &self.quantities)
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct Thaw {
    pub freeze_tx_id: Vec<u8>,
    pub timestamp: u64,
}

impl Thaw {
    pub fn validate(&self) -> Result<(), ValidationError> {
        fixed("freeze_tx_id", &self.freeze_tx_id, TX_ID_SIZE)
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct Confiscation {
    pub instrument_type: String,
    pub instrument_code: Vec<u8>,
    pub quantities: Vec<QuantityIndex>,
    pub deposit_qty: u64,
    pub timestamp: u64,
}

impl Confiscation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        instrument(&self.instrument_type, &self.instrument_code)?;
        non_empty("quantities", &self.quantities)
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct DeprecatedReconciliation {
    pub instrument_type: String,
    pub instrument_code: Vec<u8>,
    pub quantities: Vec<QuantityIndex>,
    pub timestamp: u64,
}

impl DeprecatedReconciliation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        instrument(&self.instrument_type, &self.instrument_code)?;
        non_empty("quantities", &self.quantities)
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    pub sender_indexes: Vec<u32>,
    pub receiver_indexes: Vec<u32>,
    pub message_code: u32,
    pub message_payload: Vec<u8>,
}

impl Message {
    pub fn validate(&self) -> Result<(), ValidationError> {
        max_len("message_payload", self.message_payload.len(), MAX_LONG_TEXT_LEN)
    }
}

#[derive(Serialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rejection {
    pub address_indexes: Vec<u32>,
    pub reject_address_index: u32,
    pub rejection_code: u32,
    pub message: String,
    pub timestamp: u64,
}

impl Rejection {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.rejection_code > u32::from(u8::MAX) {
            return Err(ValidationError::Invalid {
                field: "rejection_code",
                reason: format!("{} out of range", self.rejection_code),
            });
        }
        max_len("message", self.message.len(), MAX_LONG_TEXT_LEN)
    }
}

impl Vote {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// Upper bound on the decoded size of a single payload.
pub const MAX_PAYLOAD_SIZE: usize = 1 << 20;

fn config() -> impl bincode::config::Config {
    bincode::config::standard().with_limit::<MAX_PAYLOAD_SIZE>()
}

fn decode_payload<T: Decode<()>>(payload: &[u8]) -> Result<T, ProtocolError> {
    let (value, read) = bincode::decode_from_slice(payload, config())
        .map_err(|e| ProtocolError::Payload(e.to_string()))?;
    if read != payload.len() {
        return Err(ProtocolError::Payload(format!(
            "{} trailing bytes",
            payload.len() - read
        )));
    }
    Ok(value)
}

fn encode_payload<T: Encode>(payload: &T) -> Result<Vec<u8>, ProtocolError> {
    bincode::encode_to_vec(payload, config())
        .map_err(|e| ProtocolError::Payload(e.to_string()))
}

macro_rules! define_actions {
    ($($variant:ident($payload:ty) = $code:path,)+) => {
        /// A decoded protocol message.
        ///
        /// Produced only by a [`ProtocolCodec`](crate::envelope::ProtocolCodec).
        #[derive(Serialize, Clone, Debug, PartialEq, Eq)]
        pub enum Action {
            $($variant($payload),)+
        }

        impl Action {
            /// Two-character action code.
            pub fn code(&self) -> &'static str {
                match self {
                    $(Action::$variant(_) => $code,)+
                }
            }

            /// Variant name, for display.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Action::$variant(_) => stringify!($variant),)+
                }
            }

            /// Structural validation of the payload fields.
            pub fn validate(&self) -> Result<(), ValidationError> {
                match self {
                    $(Action::$variant(payload) => payload.validate(),)+
                }
            }

            /// Decode the payload of an action with the given code.
            pub fn decode_payload(code: &str, payload: &[u8]) -> Result<Self, ProtocolError> {
                match code {
                    $(c if c == $code => Ok(Action::$variant(decode_payload(payload)?)),)+
                    other => Err(ProtocolError::UnknownCode(other.to_string())),
                }
            }

            pub fn encode_payload(&self) -> Result<Vec<u8>, ProtocolError> {
                match self {
                    $(Action::$variant(payload) => encode_payload(payload),)+
                }
            }
        }

        $(
            impl From<$payload> for Action {
                fn from(payload: $payload) -> Self {
                    Action::$variant(payload)
                }
            }
        )+
    };
}

define_actions! {
    ContractOffer(ContractOffer) = codes::CONTRACT_OFFER,
    ContractFormation(ContractFormation) = codes::CONTRACT_FORMATION,
    ContractAmendment(ContractAmendment) = codes::CONTRACT_AMENDMENT,
    StaticContractFormation(StaticContractFormation) = codes::STATIC_CONTRACT_FORMATION,
    ContractAddressChange(ContractAddressChange) = codes::CONTRACT_ADDRESS_CHANGE,
    BodyOfAgreementOffer(BodyOfAgreementOffer) = codes::BODY_OF_AGREEMENT_OFFER,
    BodyOfAgreementFormation(BodyOfAgreementFormation) = codes::BODY_OF_AGREEMENT_FORMATION,
    BodyOfAgreementAmendment(BodyOfAgreementAmendment) = codes::BODY_OF_AGREEMENT_AMENDMENT,
    InstrumentDefinition(InstrumentDefinition) = codes::INSTRUMENT_DEFINITION,
    InstrumentCreation(InstrumentCreation) = codes::INSTRUMENT_CREATION,
    InstrumentModification(InstrumentModification) = codes::INSTRUMENT_MODIFICATION,
    AssetDefinition(AssetDefinition) = codes::ASSET_DEFINITION,
    AssetCreation(AssetCreation) = codes::ASSET_CREATION,
    AssetModification(AssetModification) = codes::ASSET_MODIFICATION,
    Transfer(Transfer) = codes::TRANSFER,
    Settlement(Settlement) = codes::SETTLEMENT,
    Proposal(Proposal) = codes::PROPOSAL,
    Vote(Vote) = codes::VOTE,
    BallotCast(BallotCast) = codes::BALLOT_CAST,
    BallotCounted(BallotCounted) = codes::BALLOT_COUNTED,
    Result(VoteResult) = codes::RESULT,
    Order(Order) = codes::ORDER,
    Freeze(Freeze) = codes::FREEZE,
    Thaw(Thaw) = codes::THAW,
    Confiscation(Confiscation) = codes::CONFISCATION,
    DeprecatedReconciliation(DeprecatedReconciliation) = codes::RECONCILIATION,
    Message(Message) = codes::MESSAGE,
    Rejection(Rejection) = codes::REJECTION,
}

impl Action {
    /// True if the code is in the request table.
    pub fn is_request(&self) -> bool {
        codes::is_request_code(self.code())
    }

    /// True if the code is in the response table.
    pub fn is_response(&self) -> bool {
        codes::is_response_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn instrument_code() -> Vec<u8> {
        vec![0x1c; INSTRUMENT_CODE_SIZE]
    }

    fn transfer() -> Transfer {
        Transfer {
            instruments: vec![InstrumentTransfer {
                contract_index: 0,
                instrument_type: "CCY".into(),
                instrument_code: instrument_code(),
                senders: vec![QuantityIndex { index: 0, quantity: 100 }],
                receivers: vec![
                    AddressQuantity { address: vec![1; 20], quantity: 60 },
                    AddressQuantity { address: vec![2; 20], quantity: 40 },
                ],
            }],
            offer_expiry: 0,
            exchange_fee: 0,
        }
    }

    #[test]
    fn codes_match_variants() {
        assert_eq!(Action::from(ContractOffer::default()).code(), "C1");
        assert_eq!(Action::from(VoteResult::default()).code(), "G5");
        assert_eq!(Action::from(Rejection::default()).code(), "M2");
        assert_eq!(Action::from(VoteResult::default()).name(), "Result");
    }

    #[test]
    fn request_response_flags() {
        let t = Action::from(transfer());
        assert!(t.is_request());
        assert!(!t.is_response());
        let s = Action::from(Settlement::default());
        assert!(s.is_response());
        let m = Action::from(Message::default());
        assert!(!m.is_request() && !m.is_response());
    }

    #[test]
    fn valid_transfer_passes() {
        assert_eq!(Action::from(transfer()).validate(), Ok(()));
    }

    #[test]
    fn unbalanced_transfer_fails() {
        let mut t = transfer();
        t.instruments[0].receivers[1].quantity = 41;
        assert!(matches!(
            Action::from(t).validate(),
            Err(ValidationError::Invalid { field: "receivers", .. })
        ));
    }

    #[test]
    fn transfer_requires_instruments() {
        assert_eq!(
            Action::from(Transfer::default()).validate(),
            Err(ValidationError::Required { field: "instruments" })
        );
    }

    #[test]
    fn contract_offer_requires_name() {
        let offer = ContractOffer::default();
        assert_eq!(
            offer.validate(),
            Err(ValidationError::Required { field: "contract_name" })
        );
        let offer = ContractOffer {
            contract_name: "x".repeat(MAX_TEXT_LEN + 1),
            ..Default::default()
        };
        assert!(matches!(offer.validate(), Err(ValidationError::TooLong { .. })));
    }

    #[test]
    fn instrument_code_size_enforced() {
        let creation = InstrumentCreation {
            instrument_type: "SHC".into(),
            instrument_code: vec![0; 19],
            ..Default::default()
        };
        assert_eq!(
            creation.validate(),
            Err(ValidationError::WrongSize { field: "instrument_code", expected: 20, got: 19 })
        );
    }

    #[test]
    fn order_compliance_action_checked() {
        let order = Order {
            compliance_action: b'X',
            ..Default::default()
        };
        assert!(matches!(order.validate(), Err(ValidationError::Invalid { field: "compliance_action", .. })));

        let thaw = Order {
            compliance_action: COMPLIANCE_THAW,
            freeze_tx_id: vec![0; 32],
            ..Default::default()
        };
        assert_eq!(thaw.validate(), Ok(()));
    }

    #[test]
    fn amendment_operation_bounds() {
        let a = Amendment { field_index_path: vec![1], operation: 3, data: vec![] };
        assert!(a.validate().is_err());
        let a = Amendment { field_index_path: vec![], operation: 0, data: vec![] };
        assert!(a.validate().is_err());
    }

    #[test]
    fn proposal_vote_max_bounds() {
        let p = Proposal {
            vote_options: "AB".into(),
            vote_max: 3,
            ..Default::default()
        };
        assert!(p.validate().is_err());
        let p = Proposal { vote_max: 1, ..p };
        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn payload_round_trip_through_code() {
        let action = Action::from(transfer());
        let payload = action.encode_payload().unwrap();
        let decoded = Action::decode_payload(action.code(), &payload).unwrap();
        assert_eq!(decoded, action);
    }

    #[test]
    fn unknown_code_rejected() {
        assert_eq!(
            Action::decode_payload("Z9", &[]),
            Err(ProtocolError::UnknownCode("Z9".into()))
        );
    }

    #[test]
    fn payload_trailing_bytes_rejected() {
        let mut payload = Action::from(Vote { timestamp: 7 }).encode_payload().unwrap();
        payload.push(0);
        assert!(matches!(
            Action::decode_payload(codes::VOTE, &payload),
            Err(ProtocolError::Payload(_))
        ));
    }

    #[test]
    fn serializes_to_json_with_variant_name() {
        let json = serde_json::to_string(&Action::from(Vote { timestamp: 5 })).unwrap();
        assert_eq!(json, r#"{"Vote":{"timestamp":5}}"#);
    }
}
