//! Envelope tagging of actions inside locking scripts.
//!
//! Layout: `OP_FALSE OP_RETURN <protocol id> <version> <code> <payload>`.
//! The protocol id differs between the production and test networks so a
//! test action can never be mistaken for a production one.

use itx_core::script::{OP_FALSE, OP_RETURN, Script, push_data};
use tracing::trace;

use crate::actions::Action;
use crate::error::ProtocolError;

pub const PROTOCOL_ID: &[u8] = b"TKN";
pub const TEST_PROTOCOL_ID: &[u8] = b"test.TKN";
pub const PROTOCOL_VERSION: u8 = 0;

/// Recognizes and produces actions carried in locking scripts.
pub trait ProtocolCodec: Send + Sync {
    /// Decode the action carried by `script`.
    ///
    /// Returns [`ProtocolError::NotRecognized`] for scripts that carry no
    /// envelope at all.
    fn decode(&self, script: &Script, is_test: bool) -> Result<Action, ProtocolError>;

    fn encode(&self, action: &Action, is_test: bool) -> Result<Script, ProtocolError>;
}

/// The standard envelope codec.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvelopeCodec;

impl EnvelopeCodec {
    pub fn new() -> Self {
        Self
    }

    fn protocol_id(is_test: bool) -> &'static [u8] {
        if is_test { TEST_PROTOCOL_ID } else { PROTOCOL_ID }
    }
}

impl ProtocolCodec for EnvelopeCodec {
    fn decode(&self, script: &Script, is_test: bool) -> Result<Action, ProtocolError> {
        let bytes = script.as_bytes();
        if !bytes.starts_with(&[OP_FALSE, OP_RETURN]) {
            return Err(ProtocolError::NotRecognized);
        }
        let tail = Script::from(&bytes[2..]);
        let elements = tail.elements().map_err(|_| ProtocolError::NotRecognized)?;
        let pushes: Vec<&[u8]> = elements
            .iter()
            .map(|e| e.data())
            .collect::<Option<_>>()
            .ok_or(ProtocolError::NotRecognized)?;

        let [id, version, code, payload] = pushes.as_slice() else {
            return Err(ProtocolError::NotRecognized);
        };
        if *id != Self::protocol_id(is_test) {
            return Err(ProtocolError::NotRecognized);
        }
        let version = match version {
            [] => 0,
            [v] => *v,
            _ => return Err(ProtocolError::NotRecognized),
        };
        if version != PROTOCOL_VERSION {
            return Err(ProtocolError::UnsupportedVersion(version));
        }
        let code = std::str::from_utf8(code)
            .map_err(|_| ProtocolError::UnknownCode(String::from_utf8_lossy(code).into_owned()))?;

        let action = Action::decode_payload(code, payload)?;
        trace!(code, "decoded action envelope");
        Ok(action)
    }

    fn encode(&self, action: &Action, is_test: bool) -> Result<Script, ProtocolError> {
        let payload = action.encode_payload()?;
        let mut bytes = vec![OP_FALSE, OP_RETURN];
        push_data(&mut bytes, Self::protocol_id(is_test));
        push_data(&mut bytes, &[PROTOCOL_VERSION]);
        push_data(&mut bytes, action.code().as_bytes());
        push_data(&mut bytes, &payload);
        Ok(Script::new(bytes))
    }
}
