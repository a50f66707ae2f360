//! Host services: wall-clock time, random numbers and regex execution

pub mod regex;

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch
pub fn now_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}

/// Time-based seed for `Math.random`, never zero
pub fn random_seed() -> u64 {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x1234_5678_9abc_def0);
    if seed == 0 { 0x1234_5678_9abc_def0 } else { seed }
}

/// Advance a xorshift64 state and return a number in [0, 1)
pub fn next_random(state: &mut u64) -> f64 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    *state = x;
    // Upper 53 bits
    let mantissa = x >> 11;
    (mantissa as f64) / ((1u64 << 53) as f64)
}
