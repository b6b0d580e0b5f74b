//! Fuzz target: access evaluation over arbitrary user JSON.
//!
//! Whatever the payload, `can_moderate` must agree with the presence of a
//! privileged role, flag or group.

#![no_main]

use algomarket_core::{can_moderate, Role, User};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(user) = serde_json::from_slice::<User>(data) else {
        return;
    };
    let profile = user.profile();
    let expected = matches!(profile.role, Some(Role::Moderator | Role::Admin))
        || profile.flags.any()
        || profile.groups.iter().any(|g| g.is_privileged());
    assert_eq!(can_moderate(Some(&profile)), expected);
    assert_eq!(user.can_moderate(), expected);
});
