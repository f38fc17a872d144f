//! # itx-inspector
//! Inspected transactions for the embedded token protocol.
//!
//! An [`InspectedTransaction`] wraps a raw transaction, resolves what each
//! input spends, detects the protocol actions carried in locking scripts,
//! and answers the questions a contract agent asks about a transaction:
//! fee, request or response, relevance to a script, reply ordering.
//!
//! Records persist in a small versioned format; see [`codec`].

pub mod codec;
pub mod config;
pub mod construct;
pub mod detect;
pub mod error;
pub mod render;
pub mod resolve;
pub mod sort;
pub mod transaction;

pub use codec::FormatVersion;
pub use config::{InspectorConfig, LogFormat};
pub use error::{InspectorError, Mismatch};
pub use sort::sort_by_reordering_timestamp;
pub use transaction::{InspectedTransaction, Rejection, ResolvedInput, ResolvedOutput};
