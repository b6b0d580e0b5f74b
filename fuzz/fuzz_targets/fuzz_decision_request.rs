//! Fuzz target: decoding a decision body and turning it into a `Decision`.
//!
//! A rejection that converts must always carry a non-blank reason.

#![no_main]

use algomarket_core::{Decision, DecisionRequest, Verdict};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(request) = serde_json::from_slice::<DecisionRequest>(data) else {
        return;
    };
    let Ok(decision) = Decision::try_from(request) else {
        return;
    };
    if decision.verdict() == Verdict::Rejected {
        let reason = decision.reason().expect("a rejection carries its reason");
        assert!(!reason.as_str().trim().is_empty(), "rejection reason must not be blank");
    }
    let wire = DecisionRequest::from(&decision);
    assert_eq!(wire.status, decision.verdict());
});
