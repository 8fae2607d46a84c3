//! Fuzz target: HTML rendering of loaded code.
//!
//! Whatever a user saved, the rendered `<pre>` body must not contain raw
//! markup characters.

#![no_main]

use codebin_gateway::page::escape_html;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let code = String::from_utf8_lossy(data);
    let escaped = escape_html(&code);
    assert!(!escaped.contains('<'), "escaped output must not contain '<'");
    assert!(!escaped.contains('>'), "escaped output must not contain '>'");
    assert!(!escaped.contains('"'), "escaped output must not contain '\"'");
});
