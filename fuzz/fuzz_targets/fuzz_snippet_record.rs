//! Fuzz target: decoding a stored snippet record.
//!
//! Corrupt files in the data directory go through this path during a sweep;
//! decoding must fail cleanly, and anything that decodes must carry a
//! non-empty id.

#![no_main]

use codebin_core::Snippet;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(snippet) = serde_json::from_slice::<Snippet>(data) {
        assert!(!snippet.id.as_str().is_empty(), "decoded snippet must have an id");
    }
});
