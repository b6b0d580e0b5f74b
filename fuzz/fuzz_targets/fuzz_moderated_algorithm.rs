//! Fuzz target: decoding moderation records from the backend.
//!
//! Decoding and the consistency check must never panic, and a decoded
//! record must survive re-encoding.

#![no_main]

use algomarket_core::ModeratedAlgorithm;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(records) = serde_json::from_slice::<Vec<ModeratedAlgorithm>>(data) else {
        return;
    };
    for record in &records {
        let _ = record.check_invariants();
        let _ = record.code_len();
    }
    let json = serde_json::to_string(&records).expect("decoded records re-encode");
    let again: Vec<ModeratedAlgorithm> =
        serde_json::from_str(&json).expect("re-encoded records decode");
    assert_eq!(again, records);
});
