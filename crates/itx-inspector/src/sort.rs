//! Causal ordering of contract responses.
//!
//! Responses carry the time the contract processed the request. Sorting
//! recovered outgoing transactions by that timestamp replays them in their
//! original order.

use std::borrow::Borrow;

use itx_protocol::Action;

use crate::transaction::InspectedTransaction;

/// Timestamp of a response-like action.
fn response_timestamp(action: &Action) -> Option<u64> {
    match action {
        Action::InstrumentCreation(a) => Some(a.timestamp),
        Action::ContractFormation(a) => Some(a.timestamp),
        Action::BodyOfAgreementFormation(a) => Some(a.timestamp),
        Action::Freeze(a) => Some(a.timestamp),
        Action::Thaw(a) => Some(a.timestamp),
        Action::Confiscation(a) => Some(a.timestamp),
        Action::DeprecatedReconciliation(a) => Some(a.timestamp),
        Action::Vote(a) => Some(a.timestamp),
        Action::BallotCounted(a) => Some(a.timestamp),
        Action::Result(a) => Some(a.timestamp),
        Action::Rejection(a) => Some(a.timestamp),
        Action::Settlement(a) => Some(a.timestamp),
        _ => None,
    }
}

impl InspectedTransaction {
    /// Timestamp of the first output carrying a response-like action.
    pub fn reordering_timestamp(&self) -> Option<u64> {
        self.outputs()
            .iter()
            .filter_map(|o| o.action.as_ref())
            .find_map(response_timestamp)
    }
}

/// Stable sort by [`InspectedTransaction::reordering_timestamp`], oldest
/// first. Records without a timestamp keep their relative order at the end.
pub fn sort_by_reordering_timestamp<T: Borrow<InspectedTransaction>>(list: &mut [T]) {
    list.sort_by_cached_key(|itx| match itx.borrow().reordering_timestamp() {
        Some(ts) => (false, ts),
        None => (true, 0),
    });
}
