#![no_main]

use libfuzzer_sys::fuzz_target;

use quorum_types::{OperationFingerprint, Principal};

// Parsing arbitrary text must never panic, and anything accepted must
// print back to a form that parses to the same value.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(principal) = text.parse::<Principal>() {
        let again: Principal = principal.to_string().parse().unwrap();
        assert_eq!(again, principal);
    }
    let _ = text.parse::<OperationFingerprint>();

    // Serde paths: JSON string and bincode.
    let _ = serde_json::from_slice::<Principal>(data);
    let _ = bincode::deserialize::<Principal>(data);
});
