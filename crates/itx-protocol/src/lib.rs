//! # itx-protocol
//! Embedded protocol actions and the envelope codec that carries them.
//!
//! - [`actions`] - the [`Action`] tagged union and its payload structs
//! - [`codes`] - action codes and request/response tables
//! - [`envelope`] - [`ProtocolCodec`] and the standard [`EnvelopeCodec`]
//! - [`rejections`] - rejection codes recorded against invalid actions

pub mod actions;
pub mod codes;
pub mod envelope;
pub mod error;
pub mod rejections;

pub use actions::Action;
pub use envelope::{EnvelopeCodec, ProtocolCodec};
pub use error::{ProtocolError, ValidationError};
