//! Fuzz target: JSON deserialization of `SaveBody`.
//!
//! Arbitrary bytes fed to the `/save` body parser must never panic.

#![no_main]

use codebin_gateway::routes::SaveBody;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<SaveBody>(data);
});
