//! Fuzz target: `codec::decode_bytes`
//!
//! Drives arbitrary bytes into the inbound decoder and asserts that it
//! never panics and that unknown type names stay bounded.
//!
//! cargo fuzz run fuzz_telemetry_decoder

#![no_main]

use carlink::error::{CodecError, MAX_TYPE_NAME};
use carlink::link::codec;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match codec::decode_bytes(data) {
        Ok(_) | Err(CodecError::Malformed(_)) => {}
        Err(CodecError::UnknownType(name)) => {
            assert!(name.len() <= MAX_TYPE_NAME, "type name not truncated");
        }
    }

    // Text and byte entry points must agree.
    if let Ok(text) = core::str::from_utf8(data) {
        assert_eq!(codec::decode(text), codec::decode_bytes(data));
    }
});
