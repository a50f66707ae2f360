#![no_main]

use jsstep::{Interpreter, InterpreterConfig, RegexMode};
use libfuzzer_sys::fuzz_target;

const MAX_STEPS: usize = 100_000;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    // Stepping costs far more per byte than parsing
    if source.len() > 10_000 {
        return;
    }

    let config = InterpreterConfig {
        regex_mode: RegexMode::Inline,
        ..InterpreterConfig::default()
    };
    let Ok(mut interp) = Interpreter::with_config(source, config) else {
        return;
    };

    let mut steps = 0;
    while let Ok(true) = interp.step() {
        steps += 1;
        if steps > MAX_STEPS || interp.is_paused() {
            break;
        }
    }
});
