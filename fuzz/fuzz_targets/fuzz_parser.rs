#![no_main]

use jsstep::parse_program;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    if source.len() > 100_000 {
        return;
    }

    // Ok or Err, never a panic
    let _ = parse_program(source);
});
