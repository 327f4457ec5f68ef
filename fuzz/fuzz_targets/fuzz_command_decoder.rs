//! Fuzz target: `codec::decode_command`
//!
//! Any command the decoder accepts must re-encode to a frame that decodes
//! to the same command.
//!
//! cargo fuzz run fuzz_command_decoder

#![no_main]

use carlink::link::codec;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(cmd) = codec::decode_command(text) {
        assert_eq!(codec::decode_command(&codec::encode(&cmd)), Ok(cmd));
    }
});
