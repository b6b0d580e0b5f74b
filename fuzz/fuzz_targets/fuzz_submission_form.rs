//! Fuzz target: tag parsing and submission validation on arbitrary text.

#![no_main]

use algomarket_core::{parse_tags, SubmissionForm};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    for tag in parse_tags(text) {
        assert!(!tag.is_empty() && tag.trim() == tag, "tags are trimmed and non-empty");
    }

    let mut parts = text.splitn(4, '\n');
    let form = SubmissionForm {
        title: parts.next().unwrap_or_default().to_owned(),
        description: parts.next().unwrap_or_default().to_owned(),
        price: parts.next().unwrap_or_default().to_owned(),
        code: parts.next().unwrap_or_default().to_owned(),
        tags: text.to_owned(),
        is_paid: data.first().is_some_and(|b| b & 1 == 1),
        ..SubmissionForm::default()
    };
    if let Ok(algorithm) = form.validate() {
        assert!(!algorithm.title.trim().is_empty());
        assert!(!algorithm.code.trim().is_empty());
        assert_eq!(algorithm.pricing.is_paid(), form.is_paid);
    }
});
