//! Pure speed and accuracy calculations.
//!
//! Every function guards its denominator and returns 0 instead of
//! dividing by zero, so a session finalized before the clock moved (or
//! with nothing typed) produces all-zero figures rather than a panic.

/// Typing speed in words per minute. A word is 5 keystrokes by convention.
pub fn wpm(keystrokes: u32, duration_secs: f64) -> f64 {
    if duration_secs <= 0.0 {
        return 0.0;
    }
    let words = keystrokes as f64 / 5.0;
    words / duration_secs * 60.0
}

/// Typing speed in characters per minute.
pub fn cpm(keystrokes: u32, duration_secs: f64) -> f64 {
    if duration_secs <= 0.0 {
        return 0.0;
    }
    keystrokes as f64 / duration_secs * 60.0
}

/// Typing speed in depressions per hour.
pub fn dph(keystrokes: u32, duration_secs: f64) -> f64 {
    if duration_secs <= 0.0 {
        return 0.0;
    }
    keystrokes as f64 / duration_secs * 3600.0
}

/// Share of correct keystrokes among everything the test demanded,
/// with corrections counted against the typist, as a percentage.
pub fn accuracy(total_required_keystrokes: u32, correct_keystrokes: u32, corrections: u32) -> f64 {
    let total = total_required_keystrokes + corrections;
    if total == 0 {
        return 0.0;
    }
    correct_keystrokes as f64 / total as f64 * 100.0
}
