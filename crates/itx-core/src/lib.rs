//! # itx-core
//! Ledger primitives and collaborator traits for transaction inspection.

pub mod address;
pub mod builder;
pub mod constants;
pub mod error;
pub mod expanded;
pub mod script;
pub mod traits;
pub mod types;
pub mod utxo;
pub mod wire;
