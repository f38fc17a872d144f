//! Integration test suite for inspected transactions.
//!
//! Exercises the crates together: construction against a ledger node,
//! action detection, validation, derived queries, record format
//! compatibility across versions, and concurrent access.

pub mod helpers;
